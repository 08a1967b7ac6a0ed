//! Spreadsheet reading and writing
//!
//! Uploads are Excel workbooks (`.xlsx`, `.xls`) or CSV. Only the first
//! worksheet of a workbook is read and every cell is taken as text. Blank
//! records are skipped but keep their position in `Record::index`.

use calamine::{open_workbook_auto_from_rs, Reader};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV write error: {0}")]
    CsvFinish(String),
}

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SheetFormat {
    /// Format from the file extension, case-insensitive
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_string_lossy().to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Csv => "csv",
        }
    }
}

/// One non-blank record and its zero-based position in the sheet
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub index: usize,
    pub cells: Vec<String>,
}

pub fn read_records(format: SheetFormat, bytes: &[u8]) -> Result<Vec<Record>, SpreadsheetError> {
    match format {
        SheetFormat::Csv => read_csv(bytes),
        SheetFormat::Xlsx | SheetFormat::Xls => read_workbook(bytes),
    }
}

/// No header record; rows may have any number of fields
fn read_csv(bytes: &[u8]) -> Result<Vec<Record>, SpreadsheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        records.push(Record {
            index,
            cells: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(records)
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<Record>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        tracing::warn!("Workbook has no worksheet");
        return Ok(Vec::new());
    };
    let range = range?;

    // The range starts at the first used cell, not at A1
    let Some((first_row, first_col)) = range.start() else {
        return Ok(Vec::new());
    };

    let mut records = Vec::new();
    for (offset, row) in range.rows().enumerate() {
        let mut cells = vec![String::new(); first_col as usize];
        cells.extend(row.iter().map(ToString::to_string));
        while cells.last().is_some_and(|cell| cell.is_empty()) {
            cells.pop();
        }

        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(Record {
            index: first_row as usize + offset,
            cells,
        });
    }

    Ok(records)
}

/// Single-sheet `.xlsx` workbook; empty cells are left unwritten
pub fn write_xlsx(sheet_name: &str, rows: &[Vec<String>]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (row_index, row) in rows.iter().enumerate() {
        for (col_index, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            worksheet.write_string(row_index as u32, col_index as u16, cell.as_str())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn write_csv(rows: &[Vec<String>]) -> Result<Vec<u8>, SpreadsheetError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| SpreadsheetError::CsvFinish(e.to_string()))
}
