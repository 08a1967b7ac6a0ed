//! Source record lookup

use serde_json::{json, Value};

use super::{is_success_envelope, send_checked, EnrichmentError};
use crate::config::SourceLookupConfig;
use crate::models::SourceCodeInfo;

pub struct SourceLookupClient {
    http_client: reqwest::Client,
    config: SourceLookupConfig,
}

impl SourceLookupClient {
    pub fn new(http_client: reqwest::Client, config: SourceLookupConfig) -> Self {
        Self { http_client, config }
    }

    /// First candidate source record for `query`, empty on any failure
    pub async fn fetch(&self, query: &str) -> SourceCodeInfo {
        match self.try_fetch(query).await {
            Ok(envelope) => decode_response(&envelope),
            Err(e) => {
                tracing::warn!(error = %e, "Source lookup failed");
                SourceCodeInfo::default()
            }
        }
    }

    async fn try_fetch(&self, query: &str) -> Result<Value, EnrichmentError> {
        let request = self
            .http_client
            .post(&self.config.url)
            .json(&json!({ "column4": query }));

        send_checked(request)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

fn decode_response(envelope: &Value) -> SourceCodeInfo {
    if !is_success_envelope(envelope) {
        tracing::warn!(ret_code = %envelope["retCode"], "Source lookup reported failure");
        return SourceCodeInfo::default();
    }

    let Some(record) = envelope.pointer("/entity/data/0") else {
        tracing::debug!("Source lookup returned no candidates");
        return SourceCodeInfo::default();
    };

    let text = |key: &str| record.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

    SourceCodeInfo {
        class_name: text("className"),
        line_number: line_number(record.get("lineNum")),
        method_name: text("methodName"),
        source_code: text("sourceCode"),
    }
}

/// `lineNum` arrives as a number or a numeric string
fn line_number(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
