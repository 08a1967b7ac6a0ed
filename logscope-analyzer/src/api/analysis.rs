//! Analysis handlers
//!
//! POST /api/analysis/start/:file_id, GET /api/analysis/results/...

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::results;
use crate::error::ApiResult;
use crate::models::{AnalysisResult, FileStatus};
use crate::AppState;

/// POST /api/analysis/start response
#[derive(Debug, Serialize)]
pub struct StartAnalysisResponse {
    pub file_id: i64,
    pub status: FileStatus,
}

/// POST /api/analysis/start/:file_id
///
/// Returns 202 once the file is ANALYZING; the run continues in the
/// background and callers poll GET /api/files/:id for the outcome.
pub async fn start_analysis(
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<StartAnalysisResponse>)> {
    let job = state.orchestrator.start_analysis(file_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(StartAnalysisResponse {
            file_id: job.file_id(),
            status: FileStatus::Analyzing,
        }),
    ))
}

/// GET /api/analysis/results/:file_id
pub async fn results_by_file(
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
) -> ApiResult<Json<Vec<AnalysisResult>>> {
    Ok(Json(results::load_results_by_file(&state.db, file_id).await?))
}

/// GET /api/analysis/results/data/:file_data_id
pub async fn results_by_row(
    State(state): State<AppState>,
    Path(file_data_id): Path<i64>,
) -> ApiResult<Json<Vec<AnalysisResult>>> {
    Ok(Json(results::load_results_by_row(&state.db, file_data_id).await?))
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analysis/start/:file_id", post(start_analysis))
        .route("/api/analysis/results/:file_id", get(results_by_file))
        .route("/api/analysis/results/data/:file_data_id", get(results_by_row))
}
