//! Database access for logscope-analyzer
//!
//! SQLite tables: `upload_file`, `file_data`, `analysis_result`.

pub mod files;
pub mod results;
pub mod rows;
pub mod store;

pub use store::{AnalysisStore, SqliteStore};

use logscope_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open (or create) the database file and ensure tables exist
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let newly_created = !db_path.exists();
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        tracing::info!("Initialized new database: {}", db_path.display());
    } else {
        tracing::info!("Opened existing database: {}", db_path.display());
    }

    init_tables(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database with tables created
///
/// The one connection never expires, so the database lives as long as the pool.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new().in_memory(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    init_tables(&pool).await?;
    Ok(pool)
}

/// Create tables and indexes if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS upload_file (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_name TEXT NOT NULL,
            file_path TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            upload_time TEXT NOT NULL,
            status TEXT NOT NULL,
            error_message TEXT,
            created_by TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS file_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL,
            column1 TEXT,
            column2 TEXT,
            column3 TEXT,
            column4 TEXT,
            data_content TEXT,
            row_index INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_result (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_id INTEGER NOT NULL,
            file_data_id INTEGER,
            result_content TEXT NOT NULL,
            analysis_time TEXT NOT NULL,
            status TEXT NOT NULL,
            log_info TEXT,
            code TEXT,
            class_name TEXT,
            line_number INTEGER,
            method_name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_file_data_file_id ON file_data(file_id)",
        "CREATE INDEX IF NOT EXISTS idx_analysis_result_file_id ON analysis_result(file_id)",
        "CREATE INDEX IF NOT EXISTS idx_analysis_result_file_data_id ON analysis_result(file_data_id)",
    ] {
        sqlx::query(index).execute(pool).await?;
    }

    tracing::info!("Database tables initialized (upload_file, file_data, analysis_result)");

    Ok(())
}

/// Parse an RFC 3339 column value
pub(crate) fn parse_timestamp(
    column: &str,
    value: &str,
) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| {
            logscope_common::Error::Internal(format!("Failed to parse {}: {}", column, e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_tables_is_idempotent() {
        let pool = init_memory_pool().await.unwrap();
        init_tables(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["analysis_result", "file_data", "upload_file"]);
    }

    #[tokio::test]
    async fn test_file_database_created_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("sub").join("logscope.db");

        let pool = init_database_pool(&db_path).await.unwrap();
        assert!(db_path.exists());
        pool.close().await;
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("upload_time", "2025-01-02T03:04:05+00:00").is_ok());
        assert!(parse_timestamp("upload_time", "yesterday").is_err());
    }
}
