//! `forumlink call`: run one operation against a fresh session.

use std::path::Path;

use anyhow::{Context, Result, bail};
use forumlink_agent::SessionAgent;
use forumlink_config::ForumSettings;
use forumlink_core::OperationRequest;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::config;
use crate::terminal_output::note_error;

/// Parse `--params`; absent means no parameters.
pub fn parse_params(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };
    match serde_json::from_str(raw).context("--params is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("--params must be a JSON object, got {other}"),
    }
}

/// Returns whether the operation succeeded.
pub async fn run(operation: &str, params: Option<&str>, config_path: Option<&Path>) -> Result<bool> {
    let params = parse_params(params)?;
    let config = config::load(config_path).await?;
    let settings = ForumSettings::from_config(&config)?;

    let session_id = format!("cli-{}", Uuid::new_v4());
    info!(session_id = %session_id, operation, "Running one-shot operation");
    let mut agent = SessionAgent::new(session_id, &settings)?;

    let result = agent
        .call(OperationRequest {
            name: operation.to_string(),
            params,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if let Some(message) = result.message() {
        note_error(message);
    }
    Ok(!result.is_error())
}
