//! Data row database operations

use logscope_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::DataRow;

fn data_row_from_row(row: &SqliteRow) -> DataRow {
    DataRow {
        id: row.get("id"),
        file_id: row.get("file_id"),
        column1: row.get("column1"),
        column2: row.get("column2"),
        column3: row.get("column3"),
        column4: row.get("column4"),
        data_content: row.get("data_content"),
        row_index: row.get("row_index"),
    }
}

/// Insert rows in one transaction, returning how many were written
pub async fn insert_rows(pool: &SqlitePool, rows: &[DataRow]) -> Result<usize> {
    let mut tx = pool.begin().await?;

    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO file_data (file_id, column1, column2, column3, column4, data_content, row_index)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(row.file_id)
        .bind(&row.column1)
        .bind(&row.column2)
        .bind(&row.column3)
        .bind(&row.column4)
        .bind(&row.data_content)
        .bind(row.row_index)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(rows.len())
}

/// Load all rows of a file in spreadsheet order
pub async fn load_rows_by_file(pool: &SqlitePool, file_id: i64) -> Result<Vec<DataRow>> {
    let rows = sqlx::query(
        r#"
        SELECT id, file_id, column1, column2, column3, column4, data_content, row_index
        FROM file_data
        WHERE file_id = ?
        ORDER BY row_index ASC, id ASC
        "#,
    )
    .bind(file_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(data_row_from_row).collect())
}
