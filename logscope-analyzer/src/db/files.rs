//! Uploaded file database operations

use logscope_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::parse_timestamp;
use crate::models::{FileStatus, UploadedFile};

const FILE_COLUMNS: &str =
    "id, file_name, file_path, file_size, upload_time, status, error_message, created_by";

fn file_from_row(row: &SqliteRow) -> Result<UploadedFile> {
    let status: String = row.get("status");
    let status = status.parse::<FileStatus>().map_err(Error::Internal)?;

    let upload_time: String = row.get("upload_time");

    Ok(UploadedFile {
        id: row.get("id"),
        file_name: row.get("file_name"),
        file_path: row.get("file_path"),
        file_size: row.get("file_size"),
        upload_time: parse_timestamp("upload_time", &upload_time)?,
        status,
        error_message: row.get("error_message"),
        created_by: row.get("created_by"),
    })
}

/// Insert a new file record, returning its id
pub async fn insert_file(pool: &SqlitePool, file: &UploadedFile) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO upload_file (file_name, file_path, file_size, upload_time, status, error_message, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&file.file_name)
    .bind(&file.file_path)
    .bind(file.file_size)
    .bind(file.upload_time.to_rfc3339())
    .bind(file.status.as_str())
    .bind(&file.error_message)
    .bind(&file.created_by)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Load a file by id
pub async fn load_file(pool: &SqlitePool, id: i64) -> Result<Option<UploadedFile>> {
    let row = sqlx::query(&format!("SELECT {} FROM upload_file WHERE id = ?", FILE_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(file_from_row).transpose()
}

/// Load every file, oldest first
pub async fn load_all_files(pool: &SqlitePool) -> Result<Vec<UploadedFile>> {
    let rows = sqlx::query(&format!("SELECT {} FROM upload_file ORDER BY id ASC", FILE_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(file_from_row).collect()
}

/// Load one page of files ordered by id
pub async fn load_files_page(pool: &SqlitePool, offset: i64, limit: i64) -> Result<Vec<UploadedFile>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM upload_file ORDER BY id ASC LIMIT ? OFFSET ?",
        FILE_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(file_from_row).collect()
}

/// Count total files
pub async fn count_files(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM upload_file")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Persist status and error message of an existing file
pub async fn update_file_status(pool: &SqlitePool, file: &UploadedFile) -> Result<()> {
    let result = sqlx::query("UPDATE upload_file SET status = ?, error_message = ? WHERE id = ?")
        .bind(file.status.as_str())
        .bind(&file.error_message)
        .bind(file.id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Uploaded file {}", file.id)));
    }
    Ok(())
}

/// Atomically move a file from `from` to `to`
///
/// Returns false when the file does not exist or is not in `from`. A move
/// the state machine does not allow is rejected without touching the row.
pub async fn compare_and_set_status(
    pool: &SqlitePool,
    id: i64,
    from: FileStatus,
    to: FileStatus,
) -> Result<bool> {
    if !from.can_transition_to(to) {
        return Err(Error::InvalidInput(format!(
            "Illegal status transition {} -> {}",
            from, to
        )));
    }

    let result = sqlx::query("UPDATE upload_file SET status = ? WHERE id = ? AND status = ?")
        .bind(to.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Fail every file still marked ANALYZING
///
/// Run at startup, before any analysis can begin: a file found ANALYZING
/// then belongs to a run that no longer exists.
pub async fn fail_interrupted_analyses(pool: &SqlitePool, message: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE upload_file SET status = ?, error_message = ? WHERE status = ?")
        .bind(FileStatus::Failed.as_str())
        .bind(message)
        .bind(FileStatus::Analyzing.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
