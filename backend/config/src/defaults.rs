//! Config defaults: applies default values to a parsed config.

use crate::schema::{CacheConfig, ForumLinkConfig, GatewayConfig, LoggingConfig};

/// Default upstream timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default latest-topics cache lifetime (seconds).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Longest accepted cache lifetime (one day).
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

pub const DEFAULT_BIND: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8787;

/// Streamable HTTP sessions idle for this long are dropped (seconds).
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: ForumLinkConfig) -> ForumLinkConfig {
    let config = apply_forum_defaults(config);
    let config = apply_cache_defaults(config);
    let config = apply_gateway_defaults(config);
    apply_logging_defaults(config)
}

/// Timeout only; credentials have no defaults.
fn apply_forum_defaults(mut config: ForumLinkConfig) -> ForumLinkConfig {
    let forum = config.forum_mut();
    if forum.timeout_secs.is_none() {
        forum.timeout_secs = Some(DEFAULT_TIMEOUT_SECS);
    }
    config
}

fn apply_cache_defaults(mut config: ForumLinkConfig) -> ForumLinkConfig {
    let cache = config.cache.get_or_insert_with(CacheConfig::default);
    if cache.ttl_secs.is_none() {
        cache.ttl_secs = Some(DEFAULT_CACHE_TTL_SECS);
    }
    config
}

fn apply_gateway_defaults(mut config: ForumLinkConfig) -> ForumLinkConfig {
    let gateway = config.gateway.get_or_insert_with(GatewayConfig::default);
    if gateway.bind.is_none() {
        gateway.bind = Some(DEFAULT_BIND.to_string());
    }
    if gateway.port.is_none() {
        gateway.port = Some(DEFAULT_PORT);
    }
    if gateway.session_idle_secs.is_none() {
        gateway.session_idle_secs = Some(DEFAULT_SESSION_IDLE_SECS);
    }
    config
}

fn apply_logging_defaults(mut config: ForumLinkConfig) -> ForumLinkConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_empty_config() {
        let config = apply_all_defaults(ForumLinkConfig::default());
        assert_eq!(config.forum.unwrap().timeout_secs, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.cache.unwrap().ttl_secs, Some(DEFAULT_CACHE_TTL_SECS));
        let gateway = config.gateway.unwrap();
        assert_eq!(gateway.port, Some(DEFAULT_PORT));
        assert_eq!(gateway.session_idle_secs, Some(DEFAULT_SESSION_IDLE_SECS));
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn keeps_explicit_values() {
        let mut config = ForumLinkConfig::default();
        config.cache_mut().ttl_secs = Some(10);
        let config = apply_all_defaults(config);
        assert_eq!(config.cache.unwrap().ttl_secs, Some(10));
    }
}
