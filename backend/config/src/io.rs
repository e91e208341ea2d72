//! Config file discovery and loading.

use crate::schema::ForumLinkConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the ForumLink config directory.
/// Priority: `FORUMLINK_CONFIG_DIR` env > `<platform config dir>/forumlink` > `./.forumlink`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FORUMLINK_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::config_dir() {
        Some(base) => base.join("forumlink"),
        None => PathBuf::from(".forumlink"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist, so that a
/// purely environment-driven deployment needs no file at all.
pub async fn load_config(path: &Path) -> Result<ForumLinkConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(ForumLinkConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse YAML text. An empty document yields the default config.
pub fn parse_config(raw: &str) -> Result<ForumLinkConfig> {
    if raw.trim().is_empty() {
        return Ok(ForumLinkConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}
