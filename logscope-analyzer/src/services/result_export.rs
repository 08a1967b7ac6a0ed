//! Analysis result export
//!
//! One sheet, one line per result joined to its data row. Written as an
//! `.xlsx` workbook unless CSV is asked for.

use logscope_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use super::spreadsheet::{write_csv, write_xlsx, SpreadsheetError};
use crate::db::{results, rows};
use crate::models::{AnalysisResult, DataRow};

/// Longest cell written; the Excel cell limit
const MAX_CELL_CHARS: usize = 32767;
const TRUNCATION_SUFFIX: &str = "...(truncated)";
const TRUNCATION_RESERVE: usize = 20;

const SHEET_NAME: &str = "Analysis Results";

const HEADER: [&str; 10] = [
    "column1",
    "column2",
    "column3",
    "column4",
    "log_info",
    "class_name",
    "line_number",
    "method_name",
    "code",
    "result_content",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// Written export file
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub rows: usize,
    pub format: ExportFormat,
}

pub struct ResultExporter {
    pool: SqlitePool,
    exports_dir: PathBuf,
}

impl ResultExporter {
    pub fn new(pool: SqlitePool, exports_dir: PathBuf) -> Self {
        Self { pool, exports_dir }
    }

    /// Write every result of `file_id`, joined to its row, as one file
    pub async fn export(&self, file_id: i64, format: ExportFormat) -> Result<ExportedFile> {
        let file_results = results::load_results_by_file(&self.pool, file_id).await?;
        if file_results.is_empty() {
            return Err(Error::InvalidInput(format!(
                "No analysis results to export for file {}",
                file_id
            )));
        }

        let rows_by_id: HashMap<i64, DataRow> = rows::load_rows_by_file(&self.pool, file_id)
            .await?
            .into_iter()
            .map(|row| (row.id, row))
            .collect();

        let sheet = sheet_rows(&file_results, &rows_by_id);
        let written = sheet.len() - 1;
        let contents = match format {
            ExportFormat::Xlsx => write_xlsx(SHEET_NAME, &sheet),
            ExportFormat::Csv => write_csv(&sheet),
        }
        .map_err(export_error)?;

        tokio::fs::create_dir_all(&self.exports_dir).await?;
        let path = self.exports_dir.join(format!(
            "analysis_result_{}_{}.{}",
            file_id,
            Uuid::new_v4().simple(),
            format.extension()
        ));
        tokio::fs::write(&path, contents).await?;

        tracing::info!(file_id, rows = written, path = %path.display(), "Exported analysis results");

        Ok(ExportedFile {
            path,
            rows: written,
            format,
        })
    }
}

/// Header followed by one line per result whose row still exists
fn sheet_rows(file_results: &[AnalysisResult], rows_by_id: &HashMap<i64, DataRow>) -> Vec<Vec<String>> {
    let mut sheet = vec![HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>()];

    for result in file_results {
        let Some(row) = rows_by_id.get(&result.file_data_id) else {
            tracing::warn!(
                file_id = result.file_id,
                file_data_id = result.file_data_id,
                "Skipping result whose data row no longer exists"
            );
            continue;
        };

        let opt = |value: &Option<String>| value.clone().unwrap_or_default();
        let line = [
            opt(&row.column1),
            opt(&row.column2),
            opt(&row.column3),
            opt(&row.column4),
            opt(&result.log_info),
            opt(&result.class_name),
            result.line_number.map(|n| n.to_string()).unwrap_or_default(),
            opt(&result.method_name),
            format_code(result.code.as_deref().unwrap_or_default()),
            result.result_content.clone(),
        ];
        sheet.push(line.iter().map(|cell| truncate_cell(cell)).collect());
    }

    sheet
}

fn export_error(e: SpreadsheetError) -> Error {
    Error::Internal(format!("Failed to write export: {}", e))
}

/// A JSON array of lines is joined with newlines; anything else is kept raw
fn format_code(code: &str) -> String {
    match serde_json::from_str::<Vec<Option<String>>>(code) {
        Ok(lines) => lines.into_iter().flatten().collect::<Vec<_>>().join("\n"),
        Err(_) => code.to_string(),
    }
}

fn truncate_cell(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_CHARS {
        return cell.to_string();
    }

    let mut cut: String = cell.chars().take(MAX_CELL_CHARS - TRUNCATION_RESERVE).collect();
    cut.push_str(TRUNCATION_SUFFIX);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{files, init_memory_pool};
    use crate::models::UploadedFile;
    use calamine::{open_workbook_auto, Data, Reader};

    /// One file with one row, one result for it and one orphan result
    async fn seeded_exporter(temp_dir: &tempfile::TempDir) -> (ResultExporter, i64) {
        let pool = init_memory_pool().await.unwrap();

        let file_id = files::insert_file(
            &pool,
            &UploadedFile::new("e.xlsx".into(), "/tmp/e.xlsx".into(), 1, "t".into()),
        )
        .await
        .unwrap();
        let fields = ["svc".to_string(), "prod".to_string(), "x".to_string(), "timeout".to_string()];
        rows::insert_rows(&pool, &[DataRow::from_fields(file_id, 0, &fields)])
            .await
            .unwrap();
        let row_id = rows::load_rows_by_file(&pool, file_id).await.unwrap()[0].id;

        let mut ok = AnalysisResult::begin(file_id, row_id);
        ok.log_info = Some("[a.b.run:3] boom".into());
        ok.code = Some(r#"["run() {", "}"]"#.into());
        ok.line_number = Some(3);
        ok.result_content = "Check the timeout".into();
        let orphan = AnalysisResult::failed(file_id, row_id + 50, "gone");
        results::insert_results_batch(&pool, &[ok, orphan]).await.unwrap();

        (ResultExporter::new(pool, temp_dir.path().join("exports")), file_id)
    }

    #[test]
    fn test_format_code() {
        assert_eq!(format_code(r#"["void run() {", "  go();", "}"]"#), "void run() {\n  go();\n}");
        assert_eq!(format_code(r#"["a", null, "b"]"#), "a\nb");
        assert_eq!(format_code("run() { go(); }"), "run() { go(); }");
        assert_eq!(format_code(""), "");
        assert_eq!(format_code("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn test_truncate_cell() {
        let short = "x".repeat(MAX_CELL_CHARS);
        assert_eq!(truncate_cell(&short), short);

        let long = "é".repeat(MAX_CELL_CHARS + 1);
        let cut = truncate_cell(&long);
        assert!(cut.ends_with(TRUNCATION_SUFFIX));
        assert!(cut.chars().count() <= MAX_CELL_CHARS);
        assert_eq!(
            cut.chars().count(),
            MAX_CELL_CHARS - TRUNCATION_RESERVE + TRUNCATION_SUFFIX.chars().count()
        );
    }

    #[tokio::test]
    async fn test_csv_export_joins_rows_and_skips_orphans() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (exporter, file_id) = seeded_exporter(&temp_dir).await;

        let exported = exporter.export(file_id, ExportFormat::Csv).await.unwrap();

        assert_eq!(exported.rows, 1);
        let name = exported.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(&format!("analysis_result_{}_", file_id)));
        assert!(name.ends_with(".csv"));

        let mut reader = csv::Reader::from_path(&exported.path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][3], "timeout");
        assert_eq!(&records[0][4], "[a.b.run:3] boom");
        assert_eq!(&records[0][6], "3");
        assert_eq!(&records[0][8], "run() {\n}");
        assert_eq!(&records[0][9], "Check the timeout");
    }

    #[tokio::test]
    async fn test_xlsx_export_is_the_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (exporter, file_id) = seeded_exporter(&temp_dir).await;

        let exported = exporter.export(file_id, ExportFormat::default()).await.unwrap();
        assert_eq!(exported.format, ExportFormat::Xlsx);
        assert_eq!(exported.rows, 1);
        assert_eq!(exported.path.extension().unwrap(), "xlsx");

        let mut workbook = open_workbook_auto(&exported.path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();

        assert_eq!(range.height(), 2);
        assert_eq!(range.get_value((0, 9)), Some(&Data::String("result_content".into())));
        assert_eq!(range.get_value((1, 3)), Some(&Data::String("timeout".into())));
        assert_eq!(range.get_value((1, 8)), Some(&Data::String("run() {\n}".into())));
    }

    #[tokio::test]
    async fn test_export_without_results_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pool = init_memory_pool().await.unwrap();
        let exporter = ResultExporter::new(pool, temp_dir.path().join("exports"));

        assert!(matches!(
            exporter.export(9, ExportFormat::Csv).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(!temp_dir.path().join("exports").exists());
    }
}
