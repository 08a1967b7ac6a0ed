//! Persistence store used by the analysis pipeline
//!
//! The orchestrator only sees `AnalysisStore`; `SqliteStore` is the
//! production implementation over the `db::*` query functions.

use async_trait::async_trait;
use logscope_common::Result;
use sqlx::SqlitePool;

use super::{files, results, rows};
use crate::models::{AnalysisResult, DataRow, FileStatus, UploadedFile};

/// Storage operations the analysis pipeline depends on
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn get_file(&self, id: i64) -> Result<Option<UploadedFile>>;

    /// Move `id` from `from` to `to` atomically; false if it was not in `from`
    async fn compare_and_set_status(&self, id: i64, from: FileStatus, to: FileStatus) -> Result<bool>;

    async fn save_file(&self, file: &UploadedFile) -> Result<()>;

    async fn find_rows_by_file(&self, file_id: i64) -> Result<Vec<DataRow>>;

    /// All-or-nothing batch write
    async fn save_results_batch(&self, results: &[AnalysisResult]) -> Result<()>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for SqliteStore {
    async fn get_file(&self, id: i64) -> Result<Option<UploadedFile>> {
        files::load_file(&self.pool, id).await
    }

    async fn compare_and_set_status(&self, id: i64, from: FileStatus, to: FileStatus) -> Result<bool> {
        files::compare_and_set_status(&self.pool, id, from, to).await
    }

    async fn save_file(&self, file: &UploadedFile) -> Result<()> {
        files::update_file_status(&self.pool, file).await
    }

    async fn find_rows_by_file(&self, file_id: i64) -> Result<Vec<DataRow>> {
        rows::load_rows_by_file(&self.pool, file_id).await
    }

    async fn save_results_batch(&self, batch: &[AnalysisResult]) -> Result<()> {
        let written = results::insert_results_batch(&self.pool, batch).await?;
        tracing::debug!(count = written, "Saved analysis results");
        Ok(())
    }
}
