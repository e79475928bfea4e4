//! Log sanitization utilities
//!
//! Keeps passwords out of debug logs and stops large zone files or WHOIS
//! dumps from flooding them.

use serde_json::Value;

/// Maximum number of characters to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Keys whose values are never written to logs.
const SENSITIVE_KEYS: &[&str] = &["password", "Password"];

/// Placeholder written in place of a redacted value.
const REDACTED: &str = "***";

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Render a JSON request body for logging with credentials masked.
pub fn redact_body(body: &Value) -> String {
    let mut masked = body.clone();
    if let Value::Object(map) = &mut masked {
        for key in SENSITIVE_KEYS {
            if let Some(v) = map.get_mut(*key) {
                *v = Value::String(REDACTED.to_string());
            }
        }
    }
    truncate_for_log(&masked.to_string())
}
