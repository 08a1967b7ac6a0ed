//! Business logic services

pub mod analysis_orchestrator;
pub mod enrichment;
pub mod file_ingest;
pub mod log_reference;
pub mod method_extractor;
pub mod result_export;
pub mod row_analyzer;
pub mod spreadsheet;
pub mod worker_pool;

pub use analysis_orchestrator::{
    AnalysisError, AnalysisJob, FileAnalysisOrchestrator, INTERRUPTED_RUN_MESSAGE,
};
pub use enrichment::{Enrichment, EnrichmentError, HttpEnrichmentClient};
pub use file_ingest::FileIngestService;
pub use log_reference::parse_method_reference;
pub use method_extractor::extract_method;
pub use result_export::{ExportFormat, ExportedFile, ResultExporter};
pub use row_analyzer::RowAnalyzer;
pub use worker_pool::WorkerPool;
