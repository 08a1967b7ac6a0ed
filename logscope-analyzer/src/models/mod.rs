//! Data model for file analysis
//!
//! UploadedFile 1—N DataRow, UploadedFile 1—N AnalysisResult,
//! DataRow 1—1 AnalysisResult per analysis run.

pub mod analysis_result;
pub mod data_row;
pub mod page;
pub mod uploaded_file;

pub use analysis_result::{AnalysisResult, AnalysisStatus, SourceCodeInfo};
pub use data_row::DataRow;
pub use page::PageResult;
pub use uploaded_file::{FileStatus, UploadedFile};
