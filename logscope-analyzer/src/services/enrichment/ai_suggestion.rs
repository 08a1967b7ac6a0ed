//! AI suggestion over a streamed response

use futures::StreamExt;
use serde_json::{json, Value};

use super::{send_checked, EnrichmentError};
use crate::config::AiSuggestionConfig;

pub struct AiSuggestionClient {
    http_client: reqwest::Client,
    config: AiSuggestionConfig,
}

impl AiSuggestionClient {
    pub fn new(http_client: reqwest::Client, config: AiSuggestionConfig) -> Self {
        Self { http_client, config }
    }

    /// Ask for a suggestion on `method_code`
    ///
    /// The streamed body is returned as-is, one `\n`-terminated line per
    /// line received.
    pub async fn suggest(&self, method_code: &str) -> Result<String, EnrichmentError> {
        let request = self
            .http_client
            .post(&self.config.url)
            .query(&[("systemCode", self.config.system_code.as_str())])
            .json(&build_request(&self.config, method_code));

        tracing::debug!(url = %self.config.url, code_len = method_code.len(), "Requesting AI suggestion");

        let response = send_checked(request).await?;

        let mut lines = LineCollector::default();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| EnrichmentError::Network(e.to_string()))?;
            lines.push(&chunk);
        }

        Ok(lines.finish())
    }
}

fn build_request(config: &AiSuggestionConfig, method_code: &str) -> Value {
    json!({
        "queryCondition": method_code,
        "querySource": [{
            "dataSetId": config.data_set_id,
            "centerIds": config.center_ids,
            "dataSetAlias": null,
            "appId": config.app_id,
        }],
        "indexPrefix": config.index_prefix,
        "options": {
            "sortBy": [{"@rownumber": "asc"}],
            "size": config.size,
            "remark": config.remark,
            "format": "std",
            "highlight": false,
            "trackTotalHits": false,
        },
        "time_zone": config.time_zone,
    })
}

/// Reassembles lines split across stream chunks
#[derive(Default)]
struct LineCollector {
    pending: Vec<u8>,
    text: String,
}

impl LineCollector {
    fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.append_line(&line[..pos]);
        }
    }

    fn finish(mut self) -> String {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.append_line(&rest);
        }
        self.text
    }

    fn append_line(&mut self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        self.text.push_str(line.trim_end_matches('\r'));
        self.text.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let config = AiSuggestionConfig {
            data_set_id: 12,
            app_id: 34,
            center_ids: vec![4343, 5],
            index_prefix: "applog-".into(),
            size: 3,
            remark: "diagnose".into(),
            ..Default::default()
        };

        let payload = build_request(&config, "run() { }");

        assert_eq!(payload["queryCondition"], "run() { }");
        assert_eq!(payload["querySource"][0]["dataSetId"], 12);
        assert_eq!(payload["querySource"][0]["appId"], 34);
        assert_eq!(payload["querySource"][0]["centerIds"], json!([4343, 5]));
        assert!(payload["querySource"][0]["dataSetAlias"].is_null());
        assert_eq!(payload["indexPrefix"], "applog-");
        assert_eq!(payload["options"]["sortBy"], json!([{"@rownumber": "asc"}]));
        assert_eq!(payload["options"]["size"], 3);
        assert_eq!(payload["options"]["remark"], "diagnose");
        assert_eq!(payload["options"]["format"], "std");
        assert_eq!(payload["options"]["highlight"], false);
        assert_eq!(payload["options"]["trackTotalHits"], false);
        assert_eq!(payload["time_zone"], "+8:00");
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut lines = LineCollector::default();
        lines.push(b"data: che");
        lines.push(b"ck null\r\ndata: ");
        lines.push(b"done\n");
        assert_eq!(lines.finish(), "data: check null\ndata: done\n");
    }

    #[test]
    fn test_trailing_line_without_newline() {
        let mut lines = LineCollector::default();
        lines.push(b"first\n\nlast");
        assert_eq!(lines.finish(), "first\n\nlast\n");
    }

    #[test]
    fn test_multibyte_split_between_chunks() {
        let text = "建议：检查空值\n".as_bytes();
        let mut lines = LineCollector::default();
        lines.push(&text[..4]);
        lines.push(&text[4..]);
        assert_eq!(lines.finish(), "建议：检查空值\n");
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(LineCollector::default().finish(), "");
    }
}
