//! Per-row analysis result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of one row's enrichment pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnalysisStatus {
    Success,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Success => "SUCCESS",
            AnalysisStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(AnalysisStatus::Success),
            "FAILED" => Ok(AnalysisStatus::Failed),
            other => Err(format!("Unknown analysis status: {}", other)),
        }
    }
}

/// Enrichment result for one data row
///
/// Created by the row analyzer, never mutated after it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Assigned on insert
    pub id: Option<i64>,
    pub file_id: i64,
    pub file_data_id: i64,
    /// AI suggestion text, or a failure description
    pub result_content: String,
    pub analysis_time: DateTime<Utc>,
    pub status: AnalysisStatus,
    pub log_info: Option<String>,
    /// Extracted method body
    pub code: Option<String>,
    pub class_name: Option<String>,
    pub line_number: Option<i32>,
    pub method_name: Option<String>,
}

impl AnalysisResult {
    /// Fresh SUCCESS result stamped with the current time
    pub fn begin(file_id: i64, file_data_id: i64) -> Self {
        Self {
            id: None,
            file_id,
            file_data_id,
            result_content: String::new(),
            analysis_time: Utc::now(),
            status: AnalysisStatus::Success,
            log_info: None,
            code: None,
            class_name: None,
            line_number: None,
            method_name: None,
        }
    }

    /// Terminal FAILED result for a row whose pipeline never produced one
    pub fn failed(file_id: i64, file_data_id: i64, reason: impl fmt::Display) -> Self {
        let mut result = Self::begin(file_id, file_data_id);
        result.fail(reason);
        result
    }

    /// Override status to FAILED, keeping whatever was already filled in
    pub fn fail(&mut self, reason: impl fmt::Display) {
        self.status = AnalysisStatus::Failed;
        self.result_content = format!("Analysis failed: {}", reason);
    }

    /// Copy the source lookup fields onto the result
    pub fn apply_source(&mut self, info: &SourceCodeInfo, code: String) {
        self.class_name = non_empty(&info.class_name);
        self.line_number = info.line_number;
        self.method_name = non_empty(&info.method_name);
        self.code = Some(code);
    }

    pub fn is_success(&self) -> bool {
        self.status == AnalysisStatus::Success
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Source lookup payload; transient, never persisted directly
///
/// `Default` is the all-empty value used when the lookup fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCodeInfo {
    pub class_name: String,
    pub line_number: Option<i32>,
    pub method_name: String,
    pub source_code: String,
}

impl SourceCodeInfo {
    pub fn is_empty(&self) -> bool {
        self.class_name.is_empty()
            && self.line_number.is_none()
            && self.method_name.is_empty()
            && self.source_code.is_empty()
    }
}
