//! Database Test Utilities

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use logscope_analyzer::db::{self, files, rows, AnalysisStore, SqliteStore};
use logscope_analyzer::models::{AnalysisResult, DataRow, FileStatus, UploadedFile};

/// Create temporary on-disk database with tables
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let pool = db::init_database_pool(&temp_dir.path().join("test_logscope.db")).await?;
    Ok((temp_dir, pool))
}

/// Insert an UPLOADED file with one row per query, returning the file id
pub async fn seed_file(pool: &SqlitePool, queries: &[&str]) -> Result<i64> {
    seed_file_with_status(pool, queries, FileStatus::Uploaded).await
}

pub async fn seed_file_with_status(
    pool: &SqlitePool,
    queries: &[&str],
    status: FileStatus,
) -> Result<i64> {
    let mut file = UploadedFile::new(
        "errors.csv".to_string(),
        "/tmp/errors.csv".to_string(),
        64,
        "tester".to_string(),
    );
    file.status = status;
    let file_id = files::insert_file(pool, &file).await?;

    let data_rows: Vec<DataRow> = queries
        .iter()
        .enumerate()
        .map(|(index, query)| {
            let fields = vec![
                "order-service".to_string(),
                "prod".to_string(),
                format!("case {}", index + 1),
                query.to_string(),
            ];
            DataRow::from_fields(file_id, index as i64, &fields)
        })
        .collect();
    rows::insert_rows(pool, &data_rows).await?;

    Ok(file_id)
}

#[derive(Default)]
struct Faults {
    rows: bool,
    batch: bool,
    status_writes: AtomicUsize,
}

/// SqliteStore with injectable failures
pub struct FaultyStore {
    inner: SqliteStore,
    faults: Faults,
}

impl FaultyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            inner: SqliteStore::new(pool),
            faults: Faults::default(),
        }
    }

    /// Row fetch always fails
    pub fn failing_rows(mut self) -> Self {
        self.faults.rows = true;
        self
    }

    /// Batch result write always fails
    pub fn failing_batch(mut self) -> Self {
        self.faults.batch = true;
        self
    }

    /// The next `count` file status writes fail
    pub fn failing_status_writes(self, count: usize) -> Self {
        self.faults.status_writes.store(count, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl AnalysisStore for FaultyStore {
    async fn get_file(&self, id: i64) -> logscope_common::Result<Option<UploadedFile>> {
        self.inner.get_file(id).await
    }

    async fn compare_and_set_status(
        &self,
        id: i64,
        from: FileStatus,
        to: FileStatus,
    ) -> logscope_common::Result<bool> {
        self.inner.compare_and_set_status(id, from, to).await
    }

    async fn save_file(&self, file: &UploadedFile) -> logscope_common::Result<()> {
        let remaining = self.faults.status_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.faults.status_writes.store(remaining - 1, Ordering::SeqCst);
            return Err(logscope_common::Error::Internal("database is locked".to_string()));
        }
        self.inner.save_file(file).await
    }

    async fn find_rows_by_file(&self, file_id: i64) -> logscope_common::Result<Vec<DataRow>> {
        if self.faults.rows {
            return Err(logscope_common::Error::Internal("rows unreadable".to_string()));
        }
        self.inner.find_rows_by_file(file_id).await
    }

    async fn save_results_batch(&self, results: &[AnalysisResult]) -> logscope_common::Result<()> {
        if self.faults.batch {
            return Err(logscope_common::Error::Internal("disk full".to_string()));
        }
        self.inner.save_results_batch(results).await
    }
}
