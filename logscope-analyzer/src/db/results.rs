//! Analysis result database operations

use logscope_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::parse_timestamp;
use crate::models::{AnalysisResult, AnalysisStatus};

const RESULT_COLUMNS: &str = "id, file_id, file_data_id, result_content, analysis_time, status, \
                              log_info, code, class_name, line_number, method_name";

fn result_from_row(row: &SqliteRow) -> Result<AnalysisResult> {
    let status: String = row.get("status");
    let status = status.parse::<AnalysisStatus>().map_err(Error::Internal)?;

    let analysis_time: String = row.get("analysis_time");

    Ok(AnalysisResult {
        id: Some(row.get("id")),
        file_id: row.get("file_id"),
        file_data_id: row.get("file_data_id"),
        result_content: row.get("result_content"),
        analysis_time: parse_timestamp("analysis_time", &analysis_time)?,
        status,
        log_info: row.get("log_info"),
        code: row.get("code"),
        class_name: row.get("class_name"),
        line_number: row.get("line_number"),
        method_name: row.get("method_name"),
    })
}

/// Insert all results in a single transaction
///
/// Either every result becomes visible or none does.
pub async fn insert_results_batch(pool: &SqlitePool, results: &[AnalysisResult]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for result in results {
        sqlx::query(
            r#"
            INSERT INTO analysis_result (
                file_id, file_data_id, result_content, analysis_time, status,
                log_info, code, class_name, line_number, method_name
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.file_id)
        .bind(result.file_data_id)
        .bind(&result.result_content)
        .bind(result.analysis_time.to_rfc3339())
        .bind(result.status.as_str())
        .bind(&result.log_info)
        .bind(&result.code)
        .bind(&result.class_name)
        .bind(result.line_number)
        .bind(&result.method_name)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(results.len())
}

/// Load all results of a file
pub async fn load_results_by_file(pool: &SqlitePool, file_id: i64) -> Result<Vec<AnalysisResult>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM analysis_result WHERE file_id = ? ORDER BY id ASC",
        RESULT_COLUMNS
    ))
    .bind(file_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(result_from_row).collect()
}

/// Load all results recorded for one data row (one per run)
pub async fn load_results_by_row(pool: &SqlitePool, file_data_id: i64) -> Result<Vec<AnalysisResult>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM analysis_result WHERE file_data_id = ? ORDER BY id ASC",
        RESULT_COLUMNS
    ))
    .bind(file_data_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(result_from_row).collect()
}
