//! Result export handler

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::services::ExportFormat;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

/// GET /api/results/export/:file_id?format=xlsx|csv
///
/// Sends the export as an attachment, `.xlsx` by default; 400 when the file
/// has no results.
pub async fn export_results(
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let exported = state.exporter.export(file_id, query.format).await?;
    let contents = tokio::fs::read(&exported.path).await?;

    let disposition = format!(
        "attachment; filename=\"analysis_result_{}.{}\"",
        file_id,
        exported.format.extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, exported.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        contents,
    )
        .into_response())
}

/// Build result routes
pub fn result_routes() -> Router<AppState> {
    Router::new().route("/api/results/export/:file_id", get(export_results))
}
