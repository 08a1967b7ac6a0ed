//! Method references embedded in log lines
//!
//! Log lines carry their origin as `[fully.qualified.method:line]`, e.g.
//! `[org.spring.config.updateCommon:98]`. The bare method name is kept for
//! diagnostics only; source lookup supplies the authoritative one.

use once_cell::sync::Lazy;
use regex::Regex;

static METHOD_REFERENCE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[([\w.]+):(\d+)\]").ok());

/// Bare method name from the first `[a.b.method:line]` marker, or "" when absent
pub fn parse_method_reference(log_info: &str) -> String {
    let Some(re) = METHOD_REFERENCE.as_ref() else {
        return String::new();
    };

    re.captures(log_info)
        .and_then(|caps| caps.get(1))
        .and_then(|qualified| qualified.as_str().rsplit('.').next())
        .unwrap_or_default()
        .to_string()
}
