//! External enrichment services
//!
//! Three independent adapters (log lookup, source lookup, AI suggestion)
//! sharing one `reqwest::Client`. None of them retries; the row analyzer
//! decides what a failure means for the row.
//!
//! Degraded responses are not errors:
//! - log lookup with a bad envelope → `LOG_RETRIEVAL_FAILED`
//! - source lookup failing in any way → empty `SourceCodeInfo`

mod ai_suggestion;
mod log_lookup;
mod source_lookup;

pub use ai_suggestion::AiSuggestionClient;
pub use log_lookup::{LogLookupClient, LOG_RETRIEVAL_FAILED};
pub use source_lookup::SourceLookupClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::AnalyzerConfig;
use crate::models::SourceCodeInfo;

/// `retCode` value of a successful response envelope
pub const RET_CODE_SUCCESS: &str = "0000";

const USER_AGENT: &str = concat!("logscope-analyzer/", env!("CARGO_PKG_VERSION"));

/// Enrichment client errors
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// The three calls made for every row
#[async_trait]
pub trait Enrichment: Send + Sync {
    /// Log message matching `query`; sentinel text on a degraded response
    async fn fetch_log(&self, query: &str) -> Result<String, EnrichmentError>;

    /// Source record for `query`; empty on any failure
    async fn fetch_source(&self, query: &str) -> SourceCodeInfo;

    /// Raw suggestion text for a method body
    async fn suggest(&self, method_code: &str) -> Result<String, EnrichmentError>;
}

/// Production client talking to the configured HTTP endpoints
pub struct HttpEnrichmentClient {
    log_lookup: LogLookupClient,
    source_lookup: SourceLookupClient,
    ai_suggestion: AiSuggestionClient,
}

impl HttpEnrichmentClient {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http.timeout())
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self {
            log_lookup: LogLookupClient::new(http_client.clone(), config.log_lookup.clone()),
            source_lookup: SourceLookupClient::new(http_client.clone(), config.source_lookup.clone()),
            ai_suggestion: AiSuggestionClient::new(http_client, config.ai_suggestion.clone()),
        })
    }
}

#[async_trait]
impl Enrichment for HttpEnrichmentClient {
    async fn fetch_log(&self, query: &str) -> Result<String, EnrichmentError> {
        self.log_lookup.fetch(query).await
    }

    async fn fetch_source(&self, query: &str) -> SourceCodeInfo {
        self.source_lookup.fetch(query).await
    }

    async fn suggest(&self, method_code: &str) -> Result<String, EnrichmentError> {
        self.ai_suggestion.suggest(method_code).await
    }
}

/// Whether an envelope carries `retCode == "0000"` (string or number)
pub(crate) fn is_success_envelope(envelope: &Value) -> bool {
    envelope.get("retCode").and_then(Value::as_str) == Some(RET_CODE_SUCCESS)
}

/// Send a prepared request, mapping transport and HTTP status failures
pub(crate) async fn send_checked(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, EnrichmentError> {
    let response = request
        .send()
        .await
        .map_err(|e| EnrichmentError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(EnrichmentError::Api(status.as_u16(), error_text));
    }

    Ok(response)
}
