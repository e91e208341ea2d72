//! Config redaction: produce safe-to-display config snapshots.
//!
//! Credential fields are masked; everything else passes through.

use serde_json::Value;

use crate::schema::ForumLinkConfig;

/// Keys whose string values are secrets.
static SECRET_KEYS: &[&str] = &["apiKey", "api_key", "token", "secret", "password"];

fn is_secret_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Keep a short prefix as a hint; never more than a third of the secret.
fn mask(secret: &str) -> String {
    let visible = (secret.chars().count() / 3).min(4);
    let prefix: String = secret.chars().take(visible).collect();
    format!("{prefix}***")
}

/// Redact a config JSON value, replacing secret strings with a masked hint.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

/// Serialize and redact a typed config in one step.
pub fn redacted_config(config: &ForumLinkConfig) -> Value {
    match serde_json::to_value(config) {
        Ok(value) => redact(&value),
        Err(_) => Value::Null,
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_secret_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}
