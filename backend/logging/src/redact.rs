//! Log Redaction Layer
//!
//! Scrubs forum API credentials from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

/// `Api-Key: <value>` header dumps, `api_key=<value>` query params and JSON `"apiKey": "<value>"`.
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(api[-_]?key"?\s*[:=]\s*"?)([^\s"&,}]+)"#).expect("static regex")
});

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").expect("static regex"));

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "${1}[REDACTED]");
    BEARER_RE
        .replace_all(&redacted, "Bearer [REDACTED]")
        .into_owned()
}
