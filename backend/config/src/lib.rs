//! `forumlink-config`: ForumLink runtime configuration management.
//!
//! Provides:
//! - Typed config schema (forum credentials, cache, gateway, logging)
//! - YAML loading with `${ENV_VAR}` substitution
//! - Environment overrides for container deployments
//! - Default value application and validation
//! - Config redaction for safe logging/display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod settings;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config};
pub use redact::{redact, redacted_config};
pub use schema::ForumLinkConfig;
pub use settings::ForumSettings;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::Context;
use forumlink_core::ForumError;
use serde_json::Value;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, and validate.
///
/// This is the main entry point for loading a config at runtime. Any failure
/// is a [`ForumError::Configuration`]: the process cannot serve without it.
pub async fn load_and_prepare(path: Option<&Path>) -> Result<ForumLinkConfig, ForumError> {
    let default_path;
    let path = match path {
        Some(p) => p,
        None => {
            default_path = config_file_path(&config_dir());
            default_path.as_path()
        }
    };

    prepare(path)
        .await
        .map_err(|e| ForumError::Configuration(format!("{e:#}")))
}

async fn prepare(path: &Path) -> anyhow::Result<ForumLinkConfig> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: ForumLinkConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(apply_env_overrides(config));

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        anyhow::bail!("invalid configuration: {}", report.summary());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "forum:\n  baseUrl: not-a-url\n  apiKey: k\n  apiUsername: u\n")
            .await
            .unwrap();

        let err = load_and_prepare(Some(&path)).await.unwrap_err();
        assert!(matches!(err, ForumError::Configuration(_)));
        assert!(err.to_string().contains("forum.baseUrl"));
    }
}
