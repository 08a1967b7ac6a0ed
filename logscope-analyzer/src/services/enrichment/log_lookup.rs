//! Log lookup over the trailing 24 hours

use chrono::{DateTime, Duration, Local};
use serde_json::{json, Value};

use super::{is_success_envelope, send_checked, EnrichmentError};
use crate::config::LogLookupConfig;

/// Text stored as the log message when the envelope reports failure
pub const LOG_RETRIEVAL_FAILED: &str = "log retrieval failed";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct LogLookupClient {
    http_client: reqwest::Client,
    config: LogLookupConfig,
}

impl LogLookupClient {
    pub fn new(http_client: reqwest::Client, config: LogLookupConfig) -> Self {
        Self { http_client, config }
    }

    /// Fetch the first log message matching `query`
    ///
    /// Transport errors and non-2xx responses are errors. A body that is not
    /// a success envelope yields `LOG_RETRIEVAL_FAILED`.
    pub async fn fetch(&self, query: &str) -> Result<String, EnrichmentError> {
        let payload = build_request(&self.config, query, Local::now());

        tracing::debug!(url = %self.config.url, "Querying log lookup service");

        let response = send_checked(self.http_client.post(&self.config.url).json(&payload)).await?;
        let body = response
            .text()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(decode_response(&body))
    }
}

fn build_request(config: &LogLookupConfig, query: &str, now: DateTime<Local>) -> Value {
    let start = now - Duration::hours(24);

    json!({
        "systemCode": config.system_code,
        "message": query,
        "startTime": start.format(TIME_FORMAT).to_string(),
        "endTime": now.format(TIME_FORMAT).to_string(),
        "conditionValueMap": {
            "condition": config.condition_key,
            "value": config.condition_value,
        },
        "size": config.size,
    })
}

/// `entity.values[0].source["@message"]`, "" when absent, sentinel on a bad envelope
fn decode_response(body: &str) -> String {
    let envelope: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Log lookup returned a non-JSON body");
            return LOG_RETRIEVAL_FAILED.to_string();
        }
    };

    if !is_success_envelope(&envelope) {
        tracing::warn!(ret_code = %envelope["retCode"], "Log lookup reported failure");
        return LOG_RETRIEVAL_FAILED.to_string();
    }

    envelope
        .pointer("/entity/values/0/source/@message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
