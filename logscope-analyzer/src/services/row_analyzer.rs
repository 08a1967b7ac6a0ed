//! Per-row enrichment pipeline
//!
//! fetch log → parse method reference → fetch source → extract method →
//! AI suggestion. Steps run in order; the first error ends the pipeline and
//! turns the partially filled result into a FAILED one.

use std::sync::Arc;

use super::enrichment::{Enrichment, EnrichmentError};
use super::log_reference::parse_method_reference;
use super::method_extractor::extract_method;
use crate::models::{AnalysisResult, DataRow};

pub struct RowAnalyzer {
    enrichment: Arc<dyn Enrichment>,
}

impl RowAnalyzer {
    pub fn new(enrichment: Arc<dyn Enrichment>) -> Self {
        Self { enrichment }
    }

    /// Analyze one row; never fails, errors become a FAILED result
    pub async fn analyze_row(&self, file_id: i64, row: &DataRow) -> AnalysisResult {
        let mut result = AnalysisResult::begin(file_id, row.id);

        let outcome = self.run_pipeline(row, &mut result).await;
        if let Err(e) = outcome {
            tracing::warn!(file_id, row_id = row.id, error = %e, "Row analysis failed");
            result.fail(e);
        }

        result
    }

    async fn run_pipeline(
        &self,
        row: &DataRow,
        result: &mut AnalysisResult,
    ) -> Result<(), EnrichmentError> {
        let query = row.query_text();

        let log_message = self.enrichment.fetch_log(query).await?;
        let log_method = parse_method_reference(&log_message);
        tracing::debug!(row_id = row.id, log_method = %log_method, "Method referenced by log");
        result.log_info = Some(log_message);

        let source = self.enrichment.fetch_source(query).await;
        if source.is_empty() {
            tracing::debug!(row_id = row.id, "No source candidate for query");
        }
        let code = extract_method(&source.source_code, &source.method_name);
        tracing::debug!(
            row_id = row.id,
            class_name = %source.class_name,
            method_name = %source.method_name,
            code_len = code.len(),
            "Extracted method"
        );
        result.apply_source(&source, code);

        let method_code = result.code.as_deref().unwrap_or_default();
        result.result_content = self.enrichment.suggest(method_code).await?;

        Ok(())
    }
}
