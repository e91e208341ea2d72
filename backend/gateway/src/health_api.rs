//! Gateway Health API
//!
//! Exposes gateway health and per-session snapshots.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use forumlink_agent::operation_names;
use serde::Serialize;
use serde_json::json;

use crate::mcp::resource_uris;
use crate::server::GatewayState;

pub const SERVICE_NAME: &str = "forumlink-gateway";

/// Which forum credentials are present. Values are never echoed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredFlags {
    pub base_url: bool,
    pub api_key: bool,
    pub api_username: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub configured: ConfiguredFlags,
    pub operations: Vec<&'static str>,
    pub resources: Vec<&'static str>,
    pub sessions: usize,
    pub uptime_seconds: i64,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    let settings = state.sessions.settings();
    let now = Utc::now();

    Json(HealthReport {
        status: "ok".into(),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        configured: ConfiguredFlags {
            base_url: !settings.base_url.is_empty(),
            api_key: !settings.api_key.is_empty(),
            api_username: !settings.api_username.is_empty(),
        },
        operations: operation_names(),
        resources: resource_uris(),
        sessions: state.sessions.len().await,
        uptime_seconds: (now - state.started_at).num_seconds(),
        timestamp: now,
    })
}

/// Handler for `GET /api/sessions/:id`
pub async fn get_session(State(state): State<GatewayState>, Path(id): Path<String>) -> Response {
    match state.sessions.snapshot(&id).await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Session not found: {id}") })),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use crate::session_registry::SessionRegistry;
    use crate::test_support::{StaticTransport, settings};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_configuration_and_sessions() {
        let state = GatewayState::new(SessionRegistry::new(settings(), StaticTransport::empty()));
        state.sessions.open("http").await;
        let app = build_router(state);

        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["configured"]["apiKey"], true);
        assert_eq!(body["operations"].as_array().unwrap().len(), 4);
        assert_eq!(body["resources"][0], "forum://session/stats");
        assert_eq!(body["sessions"], 1);
        assert!(!body.to_string().contains("test-key"));
    }

    #[tokio::test]
    async fn session_snapshot_route() {
        let state = GatewayState::new(SessionRegistry::new(settings(), StaticTransport::empty()));
        let (id, _) = state.sessions.open("http").await;
        let app = build_router(state);

        let (status, body) = get(app.clone(), &format!("/api/sessions/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session_id"], id.as_str());
        assert_eq!(body["cache_status"], "empty");
        assert_eq!(body["request_count"], 0);

        let (status, _) = get(app, "/api/sessions/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
