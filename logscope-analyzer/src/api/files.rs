//! Uploaded file handlers
//!
//! POST /api/files/upload, GET /api/files, GET /api/files/page, GET /api/files/:id

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::db::files;
use crate::error::{ApiError, ApiResult};
use crate::models::{PageResult, UploadedFile};
use crate::AppState;

const DEFAULT_CREATED_BY: &str = "anonymous";
const DEFAULT_PAGE_SIZE: u32 = 10;

/// GET /api/files/page query
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn first_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// POST /api/files/upload
///
/// Multipart fields: `file` (required), `createdBy` (optional).
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedFile>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut created_by: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                upload = Some((name, bytes.to_vec()));
            }
            Some("createdBy") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read createdBy: {}", e)))?;
                created_by = Some(value);
            }
            _ => {}
        }
    }

    let (name, bytes) = upload.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let created_by = created_by
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CREATED_BY.to_string());

    let file = state.ingest.ingest(&name, &bytes, &created_by).await?;

    Ok((StatusCode::CREATED, Json(file)))
}

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<UploadedFile>>> {
    Ok(Json(files::load_all_files(&state.db).await?))
}

/// GET /api/files/page?page=&size=
pub async fn list_files_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PageResult<UploadedFile>>> {
    if query.page == 0 || query.size == 0 {
        return Err(ApiError::BadRequest("page and size must be at least 1".to_string()));
    }

    let offset = (i64::from(query.page) - 1) * i64::from(query.size);
    let total = files::count_files(&state.db).await?;
    let data = files::load_files_page(&state.db, offset, i64::from(query.size)).await?;

    Ok(Json(PageResult::new(query.page, query.size, total, data)))
}

/// GET /api/files/:id
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UploadedFile>> {
    files::load_file(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Uploaded file {}", id)))
}

/// Build file routes
pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/api/files/upload", post(upload_file))
        .route("/api/files", get(list_files))
        .route("/api/files/page", get(list_files_page))
        .route("/api/files/:id", get(get_file))
}
