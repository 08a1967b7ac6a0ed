//! Paginated query result

use serde::Serialize;

/// One page of records plus paging totals
#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    /// 1-based page number
    pub page: u32,
    pub size: u32,
    pub total: i64,
    pub total_pages: i64,
    pub data: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn new(page: u32, size: u32, total: i64, data: Vec<T>) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            (total + size as i64 - 1) / size as i64
        };
        Self {
            page,
            size,
            total,
            total_pages,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PageResult::<()>::new(1, 10, 0, vec![]).total_pages, 0);
        assert_eq!(PageResult::<()>::new(1, 10, 10, vec![]).total_pages, 1);
        assert_eq!(PageResult::<()>::new(1, 10, 11, vec![]).total_pages, 2);
        assert_eq!(PageResult::<()>::new(1, 3, 7, vec![]).total_pages, 3);
    }
}
