//! ForumLink runtime configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every field is optional on disk;
//! `defaults` fills the gaps and `validation` enforces the required ones.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for ForumLink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumLinkConfig {
    /// Upstream forum connection and credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forum: Option<ForumConfig>,

    /// Latest-topics cache policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfig>,

    /// HTTP/WebSocket gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Forum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumConfig {
    /// e.g. `https://forum.example.com`
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_username: Option<String>,
    /// Upper bound on a single upstream call.
    pub timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    pub ttl_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    /// Idle streamable HTTP sessions are dropped after this many seconds.
    pub session_idle_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// Directory for rolling NDJSON logs. File logging is off when unset.
    pub dir: Option<String>,
    /// Emit console logs as JSON instead of human-readable text.
    pub json: Option<bool>,
}

impl ForumLinkConfig {
    pub fn forum_mut(&mut self) -> &mut ForumConfig {
        self.forum.get_or_insert_with(ForumConfig::default)
    }

    pub fn gateway_mut(&mut self) -> &mut GatewayConfig {
        self.gateway.get_or_insert_with(GatewayConfig::default)
    }

    pub fn logging_mut(&mut self) -> &mut LoggingConfig {
        self.logging.get_or_insert_with(LoggingConfig::default)
    }

    pub fn cache_mut(&mut self) -> &mut CacheConfig {
        self.cache.get_or_insert_with(CacheConfig::default)
    }

    pub fn bind_address(&self) -> String {
        let gateway = self.gateway.as_ref();
        let bind = gateway
            .and_then(|g| g.bind.clone())
            .unwrap_or_else(|| crate::defaults::DEFAULT_BIND.to_string());
        let port = gateway
            .and_then(|g| g.port)
            .unwrap_or(crate::defaults::DEFAULT_PORT);
        format!("{bind}:{port}")
    }

    pub fn session_idle_secs(&self) -> u64 {
        self.gateway
            .as_ref()
            .and_then(|g| g.session_idle_secs)
            .unwrap_or(crate::defaults::DEFAULT_SESSION_IDLE_SECS)
    }

    pub fn log_level(&self) -> String {
        self.logging
            .as_ref()
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| crate::defaults::DEFAULT_LOG_LEVEL.to_string())
    }
}
