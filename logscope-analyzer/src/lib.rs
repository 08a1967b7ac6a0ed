//! logscope-analyzer library interface
//!
//! Exposes the service components and router for the binary and for
//! integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::SqliteStore;
use crate::services::{
    Enrichment, FileAnalysisOrchestrator, FileIngestService, ResultExporter, RowAnalyzer, WorkerPool,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub orchestrator: Arc<FileAnalysisOrchestrator>,
    pub ingest: Arc<FileIngestService>,
    pub exporter: Arc<ResultExporter>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the services over one database pool and one worker pool
    pub fn new(
        db: SqlitePool,
        enrichment: Arc<dyn Enrichment>,
        workers: WorkerPool,
        uploads_dir: PathBuf,
        exports_dir: PathBuf,
    ) -> Self {
        let store = Arc::new(SqliteStore::new(db.clone()));
        let analyzer = Arc::new(RowAnalyzer::new(enrichment));

        Self {
            orchestrator: Arc::new(FileAnalysisOrchestrator::new(store, analyzer, workers)),
            ingest: Arc::new(FileIngestService::new(db.clone(), uploads_dir)),
            exporter: Arc::new(ResultExporter::new(db.clone(), exports_dir)),
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// `max_body_bytes` caps request bodies, uploads included.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(api::file_routes())
        .merge(api::analysis_routes())
        .merge(api::result_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
