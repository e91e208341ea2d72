//! Config validation: field-level checks with user-friendly error messages.

use crate::defaults::MAX_CACHE_TTL_SECS;
use crate::schema::ForumLinkConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors joined into one line, for a fatal startup message.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ForumLinkConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_forum(config, &mut report);
    validate_cache(config, &mut report);
    validate_gateway(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map_or(true, str::is_empty)
}

/// Base URL, API key and API username are all required.
fn validate_forum(config: &ForumLinkConfig, report: &mut ValidationReport) {
    let Some(forum) = &config.forum else {
        report.error("forum", "Forum section is missing (baseUrl, apiKey, apiUsername are required)");
        return;
    };

    if is_blank(&forum.base_url) {
        report.error("forum.baseUrl", "Base URL is required");
    } else if let Some(url) = &forum.base_url {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.error("forum.baseUrl", "Base URL must start with http:// or https://");
        }
    }
    if is_blank(&forum.api_key) {
        report.error("forum.apiKey", "API key is required");
    }
    if is_blank(&forum.api_username) {
        report.error("forum.apiUsername", "API username is required");
    }
    if forum.timeout_secs == Some(0) {
        report.error("forum.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_cache(config: &ForumLinkConfig, report: &mut ValidationReport) {
    let Some(cache) = &config.cache else { return };
    match cache.ttl_secs {
        Some(0) => report.warn("cache.ttlSecs", "ttlSecs is 0; every latest-topics call will refetch"),
        Some(ttl) if ttl > MAX_CACHE_TTL_SECS => report.error(
            "cache.ttlSecs",
            format!("ttlSecs must be <= {MAX_CACHE_TTL_SECS}, got {ttl}"),
        ),
        _ => {}
    }
}

fn validate_gateway(config: &ForumLinkConfig, report: &mut ValidationReport) {
    let Some(gateway) = &config.gateway else { return };
    if gateway.session_idle_secs == Some(0) {
        report.error("gateway.sessionIdleSecs", "sessionIdleSecs must be > 0");
    }
}

fn validate_logging(config: &ForumLinkConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        let bare = !level.contains('=') && !level.contains(',');
        if bare && !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.warn("logging.level", format!("Unrecognized log level '{level}'"));
        }
    }
}
