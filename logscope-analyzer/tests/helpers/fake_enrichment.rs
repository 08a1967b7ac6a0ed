//! Scripted stand-in for the external enrichment services

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use logscope_analyzer::models::SourceCodeInfo;
use logscope_analyzer::services::{Enrichment, EnrichmentError};

/// Answers every call from the row's query text
///
/// The source returned for query `q` contains `q` inside `handle()`, so the
/// suggestion call can be failed per row.
#[derive(Default)]
pub struct ScriptedEnrichment {
    /// Queries whose AI suggestion fails with a transport error
    pub fail_suggest_for: HashSet<String>,
    /// Queries whose AI suggestion panics
    pub panic_suggest_for: HashSet<String>,
    /// Delay inside every suggestion call
    pub suggest_delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedEnrichment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_suggest(mut self, query: &str) -> Self {
        self.fail_suggest_for.insert(query.to_string());
        self
    }

    pub fn panicking_suggest(mut self, query: &str) -> Self {
        self.panic_suggest_for.insert(query.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.suggest_delay = Some(delay);
        self
    }

    /// Most suggestion calls observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enrichment for ScriptedEnrichment {
    async fn fetch_log(&self, query: &str) -> Result<String, EnrichmentError> {
        Ok(format!("ERROR [org.demo.OrderService.handle:42] {}", query))
    }

    async fn fetch_source(&self, query: &str) -> SourceCodeInfo {
        SourceCodeInfo {
            class_name: "org.demo.OrderService".to_string(),
            line_number: Some(42),
            method_name: "handle".to_string(),
            source_code: format!(
                "class OrderService {{ void handle() {{ log(\"{}\"); }} void other() {{ }} }}",
                query
            ),
        }
    }

    async fn suggest(&self, method_code: &str) -> Result<String, EnrichmentError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.suggest_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_suggest_for.iter().any(|q| method_code.contains(q.as_str())) {
            panic!("suggestion service client crashed");
        }
        if self.fail_suggest_for.iter().any(|q| method_code.contains(q.as_str())) {
            return Err(EnrichmentError::Network("connection reset".to_string()));
        }

        Ok(format!("Suggestion for {}\n", method_code))
    }
}
