//! CLI Status Command
//!
//! Queries a running gateway's `/health` endpoint.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::terminal_output::{Column, dim, note_error, note_success, render_table};

pub async fn run(port: u16) -> Result<()> {
    let url = format!("http://localhost:{port}/health");
    let client = reqwest::Client::new();

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(_) => {
            note_error(&format!("ForumLink is not running on port {port}"));
            return Ok(());
        }
    };

    let body: Value = response
        .json()
        .await
        .with_context(|| format!("Unexpected response from {url}"))?;

    note_success(&format!(
        "{} {} is {}",
        body["service"].as_str().unwrap_or("forumlink-gateway"),
        body["version"].as_str().unwrap_or("?"),
        body["status"].as_str().unwrap_or("unknown"),
    ));
    println!("{}", render_table(&[Column::left("Check"), Column::left("Value")], &health_rows(&body)));
    println!("{}", dim(&format!("as of {}", body["timestamp"].as_str().unwrap_or("-"))));
    Ok(())
}

fn flag(value: &Value) -> String {
    if value.as_bool().unwrap_or(false) { "yes" } else { "no" }.to_string()
}

fn health_rows(body: &Value) -> Vec<Vec<String>> {
    let configured = &body["configured"];
    let list = |key: &str| {
        body[key]
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "))
            .unwrap_or_default()
    };
    vec![
        vec!["Forum URL configured".into(), flag(&configured["baseUrl"])],
        vec!["API key configured".into(), flag(&configured["apiKey"])],
        vec!["API username configured".into(), flag(&configured["apiUsername"])],
        vec!["Active sessions".into(), body["sessions"].to_string()],
        vec!["Operations".into(), list("operations")],
        vec!["Resources".into(), list("resources")],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_summarize_health_body() {
        let body = json!({
            "configured": {"baseUrl": true, "apiKey": false, "apiUsername": true},
            "sessions": 3,
            "operations": ["get_topic", "search_posts"],
            "resources": ["forum://session/stats"],
        });
        let rows = health_rows(&body);
        assert_eq!(rows[1], vec!["API key configured".to_string(), "no".to_string()]);
        assert_eq!(rows[3][1], "3");
        assert_eq!(rows[4][1], "get_topic, search_posts");
    }
}
