//! Environment handling for config values.
//!
//! Two passes run at load time:
//! - `${VAR_NAME}` references inside string values are substituted
//!   (`$${VAR}` escapes to a literal `${VAR}`). Only uppercase names match.
//! - Well-known variables (`DISCOURSE_URL`, `FORUMLINK_PORT`, ...) override
//!   whatever the file said.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::ForumLinkConfig;

/// `${NAME}` with an optional leading `$` marking an escape.
static ENV_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$?)\{([A-Z_][A-Z0-9_]*)\}").expect("static regex"));

pub const ENV_BASE_URL: &str = "DISCOURSE_URL";
pub const ENV_API_KEY: &str = "DISCOURSE_API_KEY";
pub const ENV_API_USERNAME: &str = "DISCOURSE_API_USERNAME";
pub const ENV_BIND: &str = "FORUMLINK_BIND";
pub const ENV_PORT: &str = "FORUMLINK_PORT";
pub const ENV_LOG_LEVEL: &str = "FORUMLINK_LOG_LEVEL";
pub const ENV_CACHE_TTL: &str = "FORUMLINK_CACHE_TTL_SECS";
pub const ENV_SESSION_IDLE: &str = "FORUMLINK_SESSION_IDLE_SECS";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config value tree.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &process_env())
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let replaced = ENV_REF.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(replaced.into_owned())
}

/// Apply well-known environment overrides on top of a parsed config.
pub fn apply_env_overrides(config: ForumLinkConfig) -> ForumLinkConfig {
    apply_env_overrides_with(config, &process_env())
}

pub fn apply_env_overrides_with(
    mut config: ForumLinkConfig,
    env: &HashMap<String, String>,
) -> ForumLinkConfig {
    let get = |key: &str| env.get(key).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(url) = get(ENV_BASE_URL) {
        config.forum_mut().base_url = Some(url);
    }
    if let Some(key) = get(ENV_API_KEY) {
        config.forum_mut().api_key = Some(key);
    }
    if let Some(user) = get(ENV_API_USERNAME) {
        config.forum_mut().api_username = Some(user);
    }
    if let Some(bind) = get(ENV_BIND) {
        config.gateway_mut().bind = Some(bind);
    }
    if let Some(port) = get(ENV_PORT).and_then(|p| p.parse().ok()) {
        config.gateway_mut().port = Some(port);
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.logging_mut().level = Some(level);
    }
    if let Some(ttl) = get(ENV_CACHE_TTL).and_then(|t| t.parse().ok()) {
        config.cache_mut().ttl_secs = Some(ttl);
    }
    if let Some(idle) = get(ENV_SESSION_IDLE).and_then(|t| t.parse().ok()) {
        config.gateway_mut().session_idle_secs = Some(idle);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_reference() {
        let v = json!({"forum": {"apiKey": "${DISCOURSE_API_KEY}"}});
        let result = resolve_env_vars_with(&v, &env(&[("DISCOURSE_API_KEY", "k-123")])).unwrap();
        assert_eq!(result["forum"]["apiKey"], "k-123");
    }

    #[test]
    fn missing_reference_names_var_and_path() {
        let v = json!({"forum": {"apiKey": "${NOPE}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("NOPE"));
        assert!(err.contains("forum.apiKey"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"x": "$${HOME_DIR}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["x"], "${HOME_DIR}");
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = ForumLinkConfig::default();
        config.forum_mut().base_url = Some("https://old.example.com".into());

        let config = apply_env_overrides_with(
            config,
            &env(&[
                (ENV_BASE_URL, "https://new.example.com"),
                (ENV_PORT, "9100"),
                (ENV_CACHE_TTL, "not-a-number"),
                (ENV_SESSION_IDLE, "600"),
            ]),
        );
        let forum = config.forum.as_ref().unwrap();
        assert_eq!(forum.base_url.as_deref(), Some("https://new.example.com"));
        let gateway = config.gateway.as_ref().unwrap();
        assert_eq!(gateway.port, Some(9100));
        assert_eq!(gateway.session_idle_secs, Some(600));
        assert!(config.cache.is_none());
    }
}
