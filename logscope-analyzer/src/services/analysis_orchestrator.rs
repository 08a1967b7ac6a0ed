//! File analysis orchestrator
//!
//! Job-level state machine for one uploaded file:
//!
//! 1. `start_analysis` checks the file exists and atomically moves it
//!    UPLOADED → ANALYZING. Both failures are reported before any work starts.
//! 2. A detached task loads the rows, runs one `RowAnalyzer` per row on the
//!    shared `WorkerPool` and waits for all of them.
//! 3. All results are saved in one batch, then the file becomes COMPLETED.
//!    Failure to load rows or save the batch makes the file FAILED instead.
//! 4. The final status is written once, with one retry if that write fails.
//!    Files left ANALYZING by a lost run are failed by the startup sweep
//!    (`db::files::fail_interrupted_analyses`).
//!
//! A row whose pipeline fails still yields a FAILED result and does not fail
//! the file.

use futures::future::join_all;
use logscope_common::Error;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use super::row_analyzer::RowAnalyzer;
use super::worker_pool::WorkerPool;
use crate::db::AnalysisStore;
use crate::models::{AnalysisResult, FileStatus, UploadedFile};

/// Error message given to files whose run did not survive a restart
pub const INTERRUPTED_RUN_MESSAGE: &str = "Analysis failed: interrupted before completion";

const FINAL_STATUS_ATTEMPTS: u32 = 2;
const FINAL_STATUS_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Reasons `start_analysis` refuses to start a run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Uploaded file not found: {0}")]
    NotFound(i64),

    #[error("File {file_id} is {status}; analysis can only start from UPLOADED")]
    Conflict { file_id: i64, status: FileStatus },

    #[error(transparent)]
    Store(#[from] Error),
}

/// Handle to a detached analysis run
///
/// Dropping it leaves the run going.
pub struct AnalysisJob {
    file_id: i64,
    handle: JoinHandle<FileStatus>,
}

impl AnalysisJob {
    pub fn file_id(&self) -> i64 {
        self.file_id
    }

    /// Wait for the run to finish and return the status it persisted
    pub async fn wait(self) -> Result<FileStatus, JoinError> {
        self.handle.await
    }
}

pub struct FileAnalysisOrchestrator {
    store: Arc<dyn AnalysisStore>,
    analyzer: Arc<RowAnalyzer>,
    pool: WorkerPool,
}

impl FileAnalysisOrchestrator {
    pub fn new(store: Arc<dyn AnalysisStore>, analyzer: Arc<RowAnalyzer>, pool: WorkerPool) -> Self {
        Self {
            store,
            analyzer,
            pool,
        }
    }

    /// Start analyzing `file_id` in the background
    ///
    /// Returns once the file is ANALYZING; the run continues on its own task.
    pub async fn start_analysis(&self, file_id: i64) -> Result<AnalysisJob, AnalysisError> {
        let mut file = self
            .store
            .get_file(file_id)
            .await?
            .ok_or(AnalysisError::NotFound(file_id))?;

        if file.status != FileStatus::Uploaded {
            return Err(AnalysisError::Conflict {
                file_id,
                status: file.status,
            });
        }

        // A concurrent start may have won between the read and this update
        let claimed = self
            .store
            .compare_and_set_status(file_id, FileStatus::Uploaded, FileStatus::Analyzing)
            .await?;
        if !claimed {
            let current = self.store.get_file(file_id).await?;
            return Err(match current {
                Some(current) => AnalysisError::Conflict {
                    file_id,
                    status: current.status,
                },
                None => AnalysisError::NotFound(file_id),
            });
        }
        file.status = FileStatus::Analyzing;

        tracing::info!(
            file_id,
            file_name = %file.file_name,
            pool_capacity = self.pool.capacity(),
            "Analysis started"
        );

        let run = AnalysisRun {
            store: Arc::clone(&self.store),
            analyzer: Arc::clone(&self.analyzer),
            pool: self.pool.clone(),
        };
        let handle = tokio::spawn(run.execute(file));

        Ok(AnalysisJob { file_id, handle })
    }
}

/// Everything the detached task needs
struct AnalysisRun {
    store: Arc<dyn AnalysisStore>,
    analyzer: Arc<RowAnalyzer>,
    pool: WorkerPool,
}

impl AnalysisRun {
    async fn execute(self, mut file: UploadedFile) -> FileStatus {
        let file_id = file.id;
        let started = std::time::Instant::now();

        match self.analyze_rows(file_id).await {
            Ok(summary) => {
                file.status = FileStatus::Completed;
                file.error_message = None;
                tracing::info!(
                    file_id,
                    rows = summary.rows,
                    failed_rows = summary.failed_rows,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Analysis completed"
                );
            }
            Err(e) => {
                file.mark_failed(format!("Analysis failed: {}", e));
                tracing::error!(file_id, error = %e, "Analysis run failed");
            }
        }

        self.persist_final_status(&file).await;

        file.status
    }

    async fn persist_final_status(&self, file: &UploadedFile) {
        for attempt in 1..=FINAL_STATUS_ATTEMPTS {
            match self.store.save_file(file).await {
                Ok(()) => return,
                Err(e) if attempt < FINAL_STATUS_ATTEMPTS => {
                    tracing::warn!(
                        file_id = file.id,
                        status = %file.status,
                        attempt,
                        error = %e,
                        "Failed to persist final file status, retrying"
                    );
                    tokio::time::sleep(FINAL_STATUS_RETRY_DELAY).await;
                }
                Err(e) => {
                    tracing::error!(
                        file_id = file.id,
                        status = %file.status,
                        error = %e,
                        "Failed to persist final file status; left ANALYZING until next startup"
                    );
                }
            }
        }
    }

    /// Fan out one task per row, fan in, save the batch
    async fn analyze_rows(&self, file_id: i64) -> Result<RunSummary, Error> {
        let rows = self.store.find_rows_by_file(file_id).await?;
        tracing::debug!(file_id, rows = rows.len(), "Dispatching rows to worker pool");

        let (row_ids, handles): (Vec<i64>, Vec<_>) = rows
            .into_iter()
            .map(|row| {
                let analyzer = Arc::clone(&self.analyzer);
                let row_id = row.id;
                let handle = self
                    .pool
                    .spawn(async move { analyzer.analyze_row(file_id, &row).await });
                (row_id, handle)
            })
            .unzip();

        let results: Vec<AnalysisResult> = row_ids
            .into_iter()
            .zip(join_all(handles).await)
            .map(|(row_id, joined)| match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(file_id, row_id, error = %e, "Row task aborted");
                    AnalysisResult::failed(file_id, row_id, format!("row task aborted: {}", e))
                }
            })
            .collect();

        let summary = RunSummary {
            rows: results.len(),
            failed_rows: results.iter().filter(|r| !r.is_success()).count(),
        };

        if !results.is_empty() {
            self.store.save_results_batch(&results).await?;
        }

        Ok(summary)
    }
}

struct RunSummary {
    rows: usize,
    failed_rows: usize,
}
