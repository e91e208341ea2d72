//! Resolved, validated settings handed to session agents.

use std::time::Duration;

use forumlink_core::ForumError;

use crate::defaults::{DEFAULT_CACHE_TTL_SECS, DEFAULT_TIMEOUT_SECS};
use crate::schema::ForumLinkConfig;
use crate::validation::validate;

/// Everything a session agent needs from configuration. Credentials are opaque.
#[derive(Clone)]
pub struct ForumSettings {
    /// Without trailing slash.
    pub base_url: String,
    pub api_key: String,
    pub api_username: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for ForumSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForumSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("api_username", &self.api_username)
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl ForumSettings {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_username: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_username: api_username.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }

    /// Validate `config` and extract the forum settings.
    ///
    /// Any validation error is a [`ForumError::Configuration`].
    pub fn from_config(config: &ForumLinkConfig) -> Result<Self, ForumError> {
        let report = validate(config);
        if !report.is_valid() {
            return Err(ForumError::Configuration(report.summary()));
        }

        let forum = config
            .forum
            .as_ref()
            .ok_or_else(|| ForumError::Configuration("forum section is missing".into()))?;
        let required = |value: &Option<String>, name: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ForumError::Configuration(format!("{name} is required")))
        };

        let mut settings = Self::new(
            required(&forum.base_url, "forum.baseUrl")?,
            required(&forum.api_key, "forum.apiKey")?,
            required(&forum.api_username, "forum.apiUsername")?,
        );
        if let Some(secs) = forum.timeout_secs {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = config.cache.as_ref().and_then(|c| c.ttl_secs) {
            settings.cache_ttl = Duration::from_secs(secs);
        }
        Ok(settings)
    }
}
