//! Spreadsheet upload ingestion
//!
//! Stores the uploaded workbook or CSV under `uploads/`, records it as
//! UPLOADED and extracts one `DataRow` per record before returning.

use chrono::Local;
use logscope_common::{Error, Result};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::spreadsheet::{read_records, SheetFormat, SpreadsheetError};
use crate::db::{files, rows};
use crate::models::{DataRow, UploadedFile};

const UNSUPPORTED_FORMAT: &str = "Only Excel (.xlsx, .xls) or CSV files are supported";

pub struct FileIngestService {
    pool: SqlitePool,
    uploads_dir: PathBuf,
}

impl FileIngestService {
    pub fn new(pool: SqlitePool, uploads_dir: PathBuf) -> Self {
        Self { pool, uploads_dir }
    }

    /// Store `bytes`, record the file and its rows
    ///
    /// A file whose contents cannot be read is kept as FAILED and the read
    /// error is returned.
    pub async fn ingest(&self, original_name: &str, bytes: &[u8], created_by: &str) -> Result<UploadedFile> {
        let file_name = display_name(original_name)?;
        let format = upload_format(&file_name)?;

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        let stored_path = self.uploads_dir.join(stored_file_name(format.extension()));
        tokio::fs::write(&stored_path, bytes).await?;

        let mut file = UploadedFile::new(
            file_name,
            stored_path.to_string_lossy().into_owned(),
            bytes.len() as i64,
            created_by.to_string(),
        );
        file.id = files::insert_file(&self.pool, &file).await?;

        tracing::info!(
            file_id = file.id,
            file_name = %file.file_name,
            size = file.file_size,
            path = %stored_path.display(),
            "Stored uploaded file"
        );

        let data_rows = match read_rows(file.id, format, bytes) {
            Ok(data_rows) => data_rows,
            Err(e) => {
                let message = format!("Failed to read spreadsheet: {}", e);
                tracing::warn!(file_id = file.id, error = %e, "Spreadsheet could not be read");
                file.mark_failed(message.clone());
                files::update_file_status(&self.pool, &file).await?;
                return Err(Error::InvalidInput(message));
            }
        };

        let inserted = rows::insert_rows(&self.pool, &data_rows).await?;
        tracing::info!(file_id = file.id, rows = inserted, "Extracted spreadsheet rows");

        Ok(file)
    }
}

/// Last path component of the client-supplied name
fn display_name(original_name: &str) -> Result<String> {
    Path::new(original_name.trim())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::InvalidInput("File name is required".to_string()))
}

fn upload_format(file_name: &str) -> Result<SheetFormat> {
    SheetFormat::from_file_name(file_name)
        .ok_or_else(|| Error::InvalidInput(UNSUPPORTED_FORMAT.to_string()))
}

/// `<yyyyMMddHHmmss>_<uuid>.<ext>`
fn stored_file_name(extension: &str) -> String {
    format!(
        "{}_{}.{}",
        Local::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple(),
        extension
    )
}

/// Every non-blank record becomes a row; there is no header record
fn read_rows(
    file_id: i64,
    format: SheetFormat,
    bytes: &[u8],
) -> std::result::Result<Vec<DataRow>, SpreadsheetError> {
    Ok(read_records(format, bytes)?
        .into_iter()
        .map(|record| DataRow::from_fields(file_id, record.index as i64, &record.cells))
        .collect())
}
