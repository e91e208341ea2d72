//! Config loading and logger wiring for the CLI.

use std::path::{Path, PathBuf};

use anyhow::Result;
use forumlink_config::{ForumLinkConfig, load_and_prepare};
use forumlink_logging::LoggerOptions;

/// Load the config file (or the default location) with env overrides applied.
pub async fn load(path: Option<&Path>) -> Result<ForumLinkConfig> {
    Ok(load_and_prepare(path).await?)
}

/// Logger settings from the `logging` section.
pub fn logger_options(config: &ForumLinkConfig) -> LoggerOptions {
    let logging = config.logging.as_ref();
    LoggerOptions {
        level: config.log_level(),
        log_dir: logging.and_then(|l| l.dir.as_ref()).map(PathBuf::from),
        json_console: logging.and_then(|l| l.json).unwrap_or(false),
    }
}
