//! Configuration for logscope-analyzer
//!
//! Bootstrap TOML file with built-in defaults for every key. Located via
//! `--config` → `LOGSCOPE_CONFIG` → `<config dir>/logscope/config.toml`.
//!
//! ```toml
//! bind_address = "127.0.0.1:5780"
//!
//! [analysis]
//! worker_pool_size = 10
//!
//! [log_lookup]
//! url = "http://logs.internal/api/query"
//! system_code = "ORDER"
//! ```

use logscope_common::config::{load_toml_config, locate_config_file, LoggingConfig};
use logscope_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Root folder (database, uploads); see `RootFolderResolver` for priority
    pub root_folder: Option<PathBuf>,
    pub bind_address: String,
    /// HTTP request body limit, applies to uploads
    pub max_upload_bytes: usize,
    pub logging: LoggingConfig,
    pub analysis: AnalysisConfig,
    pub http: HttpConfig,
    pub log_lookup: LogLookupConfig,
    pub source_lookup: SourceLookupConfig,
    pub ai_suggestion: AiSuggestionConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: "127.0.0.1:5780".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            logging: LoggingConfig::default(),
            analysis: AnalysisConfig::default(),
            http: HttpConfig::default(),
            log_lookup: LogLookupConfig::default(),
            source_lookup: SourceLookupConfig::default(),
            ai_suggestion: AiSuggestionConfig::default(),
        }
    }
}

/// Worker pool sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows analyzed concurrently across all files
    pub worker_pool_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 10,
        }
    }
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Log lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogLookupConfig {
    pub url: String,
    pub system_code: String,
    pub condition_key: String,
    pub condition_value: String,
    pub size: u32,
}

impl Default for LogLookupConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8081/api/log/query".to_string(),
            system_code: String::new(),
            condition_key: String::new(),
            condition_value: String::new(),
            size: 10,
        }
    }
}

/// Source lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLookupConfig {
    pub url: String,
}

impl Default for SourceLookupConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8082/api/source/query".to_string(),
        }
    }
}

/// AI suggestion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSuggestionConfig {
    pub url: String,
    pub system_code: String,
    pub data_set_id: i64,
    pub app_id: i64,
    pub center_ids: Vec<i64>,
    pub index_prefix: String,
    pub size: u32,
    pub remark: String,
    pub time_zone: String,
}

impl Default for AiSuggestionConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8083/api/ai/suggest".to_string(),
            system_code: String::new(),
            data_set_id: 0,
            app_id: 0,
            center_ids: vec![4343],
            index_prefix: String::new(),
            size: 10,
            remark: String::new(),
            time_zone: "+8:00".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Locate the TOML file, load it and validate
    ///
    /// `explicit` is the `--config` value; without it the environment and
    /// the per-user config file are tried before built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = locate_config_file(explicit)?;
        let config: Self = load_toml_config(path.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.analysis.worker_pool_size == 0 {
            return Err(Error::Config(
                "analysis.worker_pool_size must be at least 1".to_string(),
            ));
        }

        for (key, url) in [
            ("log_lookup.url", &self.log_lookup.url),
            ("source_lookup.url", &self.source_lookup.url),
            ("ai_suggestion.url", &self.ai_suggestion.url),
        ] {
            if !is_http_url(url) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    key, url
                )));
            }
        }

        if self.http.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be at least 1".to_string()));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("http://") && url.len() > "http://".len())
        || (url.starts_with("https://") && url.len() > "https://".len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.worker_pool_size, 10);
        assert_eq!(config.ai_suggestion.center_ids, vec![4343]);
        assert_eq!(config.ai_suggestion.time_zone, "+8:00");
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let mut config = AnalyzerConfig::default();
        config.analysis.worker_pool_size = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_url_rejected() {
        let mut config = AnalyzerConfig::default();
        config.source_lookup.url = String::new();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = AnalyzerConfig::default();
        config.ai_suggestion.url = "ftp://example".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AnalyzerConfig = toml::from_str(
            r#"
            bind_address = "0.0.0.0:9000"

            [analysis]
            worker_pool_size = 4

            [log_lookup]
            url = "http://logs.example/api"
            system_code = "ORD"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.analysis.worker_pool_size, 4);
        assert_eq!(config.log_lookup.url, "http://logs.example/api");
        assert_eq!(config.log_lookup.system_code, "ORD");
        assert_eq!(config.log_lookup.size, 10);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.source_lookup, SourceLookupConfig::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("analyzer.toml");
        std::fs::write(&path, "[analysis]\nworker_pool_size = 3\n").unwrap();

        let config = AnalyzerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.analysis.worker_pool_size, 3);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("absent.toml");

        assert!(matches!(
            AnalyzerConfig::load(Some(&missing)),
            Err(Error::Config(msg)) if msg.contains("Config file not found")
        ));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("analyzer.toml");
        std::fs::write(&path, "[analysis]\nworker_pool_size = 0\n").unwrap();

        assert!(matches!(AnalyzerConfig::load(Some(&path)), Err(Error::Config(_))));
    }
}
