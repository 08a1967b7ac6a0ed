//! Method body extraction from free-form source text
//!
//! Finds `methodName(...) {` and returns everything from the method name up
//! to the matching close brace. Braces inside double-quoted string literals
//! are ignored. When the signature is missing the input is returned
//! unchanged; when the body never closes nothing is returned.

use regex::Regex;

/// Extract the brace-delimited method `method_name` from `source`
///
/// - Empty `source` or empty `method_name` → `source` unchanged
/// - Signature not found → `source` unchanged
/// - Braces never balance → empty string
pub fn extract_method(source: &str, method_name: &str) -> String {
    if source.is_empty() || method_name.is_empty() {
        return source.to_string();
    }

    let Some(start) = find_signature(source, method_name) else {
        tracing::warn!(method = method_name, "Method signature not found, using full source");
        return source.to_string();
    };

    match matching_close_brace(source, start) {
        Some(end) => source[start..end].to_string(),
        None => {
            tracing::warn!(
                method = method_name,
                "Unbalanced braces after method signature, no method extracted"
            );
            String::new()
        }
    }
}

/// Byte offset of the first `name(...) {` occurrence
fn find_signature(source: &str, method_name: &str) -> Option<usize> {
    let pattern = format!(r"\b{}\s*\([^)]*\)\s*\{{", regex::escape(method_name));
    // Escaped name always yields a valid pattern
    let re = Regex::new(&pattern).ok()?;
    re.find(source).map(|m| m.start())
}

/// Byte offset one past the brace that closes the first `{` at or after `start`
fn matching_close_brace(source: &str, start: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut prev: Option<char> = if start == 0 {
        None
    } else {
        source[..start].chars().next_back()
    };

    for (offset, c) in source[start..].char_indices() {
        if c == '"' && prev != Some('\\') {
            in_string = !in_string;
        }

        if !in_string {
            match c {
                '{' => depth += 1,
                '}' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(start + offset + c.len_utf8());
                    }
                }
                _ => {}
            }
        }

        prev = Some(c);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = r#"package com.example.order;

public class OrderService {

    private final Repo repo;

    public void updateCommon(String id, int count) {
        if (id == null) {
            throw new IllegalArgumentException("id {missing}");
        }
        for (int i = 0; i < count; i++) {
            if (i % 2 == 0) {
                repo.touch(id);
            }
        }
    }

    public int size() {
        return repo.size();
    }
}
"#;

    #[test]
    fn test_extracts_nested_method_body() {
        let body = extract_method(SERVICE, "updateCommon");

        assert!(body.starts_with("updateCommon(String id, int count) {"));
        assert!(body.ends_with("        }\n    }"));
        assert!(body.contains("repo.touch(id);"));
        assert!(body.contains("\"id {missing}\""));
        assert!(!body.contains("public int size()"));
    }

    #[test]
    fn test_second_method_in_class() {
        let body = extract_method(SERVICE, "size");
        assert_eq!(body, "size() {\n        return repo.size();\n    }");
    }

    #[test]
    fn test_throws_clause_falls_back_to_source() {
        let source = "void run() throws IOException { read(); }";
        assert_eq!(extract_method(source, "run"), source);
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let source = r#"void log() { String s = "}}}"; if (x) { y("{"); } }
void other() { }"#;
        let body = extract_method(source, "log");
        assert_eq!(body, r#"log() { String s = "}}}"; if (x) { y("{"); } }"#);
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let source = r#"run() { String s = "a \" } b"; return; } tail"#;
        let body = extract_method(source, "run");
        assert_eq!(body, r#"run() { String s = "a \" } b"; return; }"#);
    }

    #[test]
    fn test_deep_nesting() {
        let source = "a() { { { { } } } } b() { }";
        assert_eq!(extract_method(source, "a"), "a() { { { { } } } }");
        assert_eq!(extract_method(source, "b"), "b() { }");
    }

    #[test]
    fn test_empty_inputs_pass_through() {
        assert_eq!(extract_method("", "run"), "");
        assert_eq!(extract_method(SERVICE, ""), SERVICE);
    }

    #[test]
    fn test_missing_method_returns_source() {
        assert_eq!(extract_method(SERVICE, "doesNotExist"), SERVICE);
    }

    #[test]
    fn test_name_must_start_at_word_boundary() {
        let source = "reupdate() { a(); } update() { b(); }";
        assert_eq!(extract_method(source, "update"), "update() { b(); }");
    }

    #[test]
    fn test_regex_metacharacters_in_name() {
        let source = "x() { }";
        assert_eq!(extract_method(source, "a.b*"), source);
    }

    #[test]
    fn test_unbalanced_braces_yield_nothing() {
        assert_eq!(extract_method("head run() { if (a) { b(); }", "run"), "");
        assert_eq!(extract_method("run() { \"}\" ", "run"), "");
    }

    #[test]
    fn test_multibyte_text() {
        let source = "// 订单服务\nvoid 处理() { log(\"完成\"); }";
        assert_eq!(extract_method(source, "处理"), "处理() { log(\"完成\"); }");
    }
}
