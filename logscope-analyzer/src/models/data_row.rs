//! One spreadsheet row

use serde::{Deserialize, Serialize};

/// Row extracted from an uploaded spreadsheet; read-only input to analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRow {
    pub id: i64,
    pub file_id: i64,
    pub column1: Option<String>,
    pub column2: Option<String>,
    pub column3: Option<String>,
    /// Free-text field used as the query for log and source lookup
    pub column4: Option<String>,
    /// Fields beyond the fourth, as a JSON array of strings
    pub data_content: Option<String>,
    pub row_index: i64,
}

impl DataRow {
    /// Build a row from raw spreadsheet fields; `id` is assigned on insert
    pub fn from_fields(file_id: i64, row_index: i64, fields: &[String]) -> Self {
        let field = |i: usize| fields.get(i).cloned();
        let data_content = if fields.len() > 4 {
            // Vec<String> always serializes
            serde_json::to_string(&fields[4..]).ok()
        } else {
            None
        };

        Self {
            id: 0,
            file_id,
            column1: field(0),
            column2: field(1),
            column3: field(2),
            column4: field(3),
            data_content,
            row_index,
        }
    }

    /// Query text sent to the log and source lookup services
    pub fn query_text(&self) -> &str {
        self.column4.as_deref().unwrap_or("")
    }
}
