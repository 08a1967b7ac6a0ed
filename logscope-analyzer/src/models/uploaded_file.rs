//! Uploaded file record and its analysis state machine
//!
//! UPLOADED → ANALYZING → COMPLETED | FAILED

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// File analysis status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileStatus {
    /// Spreadsheet stored and rows ingested, ready for analysis
    Uploaded,
    /// Analysis run in progress
    Analyzing,
    /// Every row has a result (some may be individually FAILED)
    Completed,
    /// The run itself failed; no results persisted for it
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploaded => "UPLOADED",
            FileStatus::Analyzing => "ANALYZING",
            FileStatus::Completed => "COMPLETED",
            FileStatus::Failed => "FAILED",
        }
    }

    /// Whether a run may move a file from `self` to `next`
    pub fn can_transition_to(&self, next: FileStatus) -> bool {
        matches!(
            (self, next),
            (FileStatus::Uploaded, FileStatus::Analyzing)
                | (FileStatus::Uploaded, FileStatus::Failed)
                | (FileStatus::Analyzing, FileStatus::Completed)
                | (FileStatus::Analyzing, FileStatus::Failed)
        )
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOADED" => Ok(FileStatus::Uploaded),
            "ANALYZING" => Ok(FileStatus::Analyzing),
            "COMPLETED" => Ok(FileStatus::Completed),
            "FAILED" => Ok(FileStatus::Failed),
            other => Err(format!("Unknown file status: {}", other)),
        }
    }
}

/// Uploaded spreadsheet file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub upload_time: DateTime<Utc>,
    pub status: FileStatus,
    pub error_message: Option<String>,
    pub created_by: String,
}

impl UploadedFile {
    /// New record in UPLOADED state; `id` is assigned on insert
    pub fn new(file_name: String, file_path: String, file_size: i64, created_by: String) -> Self {
        Self {
            id: 0,
            file_name,
            file_path,
            file_size,
            upload_time: Utc::now(),
            status: FileStatus::Uploaded,
            error_message: None,
            created_by,
        }
    }

    /// Move to the FAILED terminal state with a message
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = FileStatus::Failed;
        self.error_message = Some(message.into());
    }
}
