//! Streamable HTTP transport: one JSON-RPC message per `POST /mcp`.
//!
//! Sessions are created by `initialize` and named by the `Mcp-Session-Id`
//! header on every later request.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::mcp::handle_request;
use crate::rpc_protocol::{JsonRpcError, JsonRpcResponse, parse_request};
use crate::server::GatewayState;

pub const SESSION_HEADER: &str = "mcp-session-id";

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn rpc_error(status: StatusCode, id: Option<Value>, error: JsonRpcError) -> Response {
    let body = JsonRpcResponse::error(id.unwrap_or(Value::Null), error);
    (status, Json(body)).into_response()
}

/// Handler for `POST /mcp`
pub async fn post_mcp(State(state): State<GatewayState>, headers: HeaderMap, body: String) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(error) => {
            warn!(code = error.code, "Rejected malformed JSON-RPC body");
            return rpc_error(StatusCode::BAD_REQUEST, None, error);
        }
    };

    let (session_id, agent) = match session_id(&headers) {
        Some(id) => match state.sessions.get(&id).await {
            Some(agent) => (id, agent),
            None => {
                debug!(session_id = %id, "Unknown session");
                return rpc_error(
                    StatusCode::NOT_FOUND,
                    request.id,
                    JsonRpcError::session_not_found(&id),
                );
            }
        },
        None if request.method == "initialize" => state.sessions.open("http").await,
        None => {
            return rpc_error(
                StatusCode::BAD_REQUEST,
                request.id,
                JsonRpcError::invalid_request("Missing Mcp-Session-Id header"),
            );
        }
    };

    match handle_request(&agent, request).await {
        Some(response) => (StatusCode::OK, [(SESSION_HEADER, session_id)], Json(response)).into_response(),
        None => (StatusCode::ACCEPTED, [(SESSION_HEADER, session_id)]).into_response(),
    }
}

/// Handler for `DELETE /mcp`
pub async fn delete_mcp(State(state): State<GatewayState>, headers: HeaderMap) -> StatusCode {
    match session_id(&headers) {
        Some(id) if state.sessions.close(&id).await => StatusCode::NO_CONTENT,
        Some(_) => StatusCode::NOT_FOUND,
        None => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use crate::session_registry::SessionRegistry;
    use crate::test_support::{ManualClock, StaticTransport, settings};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn state() -> GatewayState {
        let transport = StaticTransport::json(json!({"latest_posts": []}));
        GatewayState::new(SessionRegistry::new(settings(), transport))
    }

    fn post(body: Value, session: Option<&str>) -> Request<Body> {
        let mut builder = Request::post("/mcp").header("content-type", "application/json");
        if let Some(id) = session {
            builder = builder.header(SESSION_HEADER, id);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn initialize_creates_session_and_calls_reuse_it() {
        let state = state();
        let app = build_router(state.clone());

        let init = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}});
        let response = app.clone().oneshot(post(init, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = response.headers()[SESSION_HEADER].to_str().unwrap().to_string();
        assert_eq!(state.sessions.len().await, 1);

        let call = json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
                          "params": {"name": "get_recent_posts", "arguments": {"limit": 3}}});
        let response = app.clone().oneshot(post(call, Some(&id))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], 2);
        assert!(body["result"]["content"][0]["text"].as_str().unwrap().contains("\"count\": 0"));

        assert_eq!(state.sessions.snapshot(&id).await.unwrap().request_count, 1);
    }

    #[tokio::test]
    async fn unknown_or_missing_session_is_rejected() {
        let app = build_router(state());
        let ping = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"});

        let response = app.clone().oneshot(post(ping.clone(), Some("nope"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], JsonRpcError::SESSION_NOT_FOUND);

        let response = app.oneshot(post(ping, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn notification_is_accepted_and_delete_ends_session() {
        let state = state();
        let app = build_router(state.clone());
        let (id, _) = state.sessions.open("http").await;

        let note = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        let response = app.clone().oneshot(post(note, Some(&id))).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let delete = Request::delete("/mcp")
            .header(SESSION_HEADER, id.as_str())
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn idle_session_is_gone_after_eviction() {
        let clock = ManualClock::new();
        let registry = SessionRegistry::new(settings(), StaticTransport::empty())
            .with_clock(clock.clock())
            .with_idle_timeout(std::time::Duration::from_secs(60));
        let state = GatewayState::new(registry);
        let app = build_router(state.clone());

        let init = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}});
        let response = app.clone().oneshot(post(init, None)).await.unwrap();
        let id = response.headers()[SESSION_HEADER].to_str().unwrap().to_string();

        clock.advance(chrono::Duration::minutes(2));
        assert_eq!(state.sessions.evict_idle().await, vec![id.clone()]);

        let ping = json!({"jsonrpc": "2.0", "id": 2, "method": "ping"});
        let response = app.oneshot(post(ping, Some(&id))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let app = build_router(state());
        let request = Request::post("/mcp").body(Body::from("{oops")).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], JsonRpcError::PARSE_ERROR);
    }
}
