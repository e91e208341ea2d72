//! MCP method handling on top of a session agent.
//!
//! Both transports funnel every parsed request through [`handle_request`];
//! only the framing differs between them.

use forumlink_agent::{SessionAgent, operations};
use forumlink_core::{ForumError, OperationRequest, OperationResult};
use serde_json::{Value, json};
use tracing::debug;

use crate::rpc_protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use crate::session_registry::SharedAgent;

pub const PROTOCOL_VERSION: &str = "2025-03-26";
pub const SERVER_NAME: &str = "forumlink";
pub const SESSION_STATS_URI: &str = "forum://session/stats";

pub fn resource_uris() -> Vec<&'static str> {
    vec![SESSION_STATS_URI]
}

/// Run one request against a session. Returns `None` for notifications.
pub async fn handle_request(agent: &SharedAgent, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    debug!(method = %request.method, "JSON-RPC request");

    if request.is_notification() {
        // notifications/initialized and friends: nothing to answer
        return None;
    }
    let id = request.id.clone().unwrap_or_default();

    let outcome = match request.method.as_str() {
        "initialize" => Ok(initialize_result()),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(tools_list()),
        "tools/call" => call_tool(agent, &request).await,
        "resources/list" => Ok(resources_list()),
        "resources/read" => read_resource(agent, &request).await,
        other => Err(JsonRpcError::method_not_found(other)),
    };

    Some(match outcome {
        Ok(result) => JsonRpcResponse::result(id, result),
        Err(error) => JsonRpcResponse::error(id, error),
    })
}

pub fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "listChanged": false },
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn tools_list() -> Value {
    let tools: Vec<Value> = operations().iter().map(|op| op.descriptor()).collect();
    json!({ "tools": tools })
}

fn resources_list() -> Value {
    json!({
        "resources": [{
            "uri": SESSION_STATS_URI,
            "name": "Session statistics",
            "description": "Request count, last request time and topic cache status for this session",
            "mimeType": "application/json",
        }]
    })
}

async fn call_tool(agent: &SharedAgent, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
    let name = request
        .param("name")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params("tools/call requires a string 'name'"))?;
    let arguments = request.param("arguments").cloned();

    let mut agent = agent.lock().await;
    let result = agent
        .call(OperationRequest::from_arguments(name, arguments))
        .await
        .map_err(rpc_error)?;
    Ok(tool_content(&result))
}

/// MCP tool result: pretty JSON as a single text block, flagged on failure.
pub fn tool_content(result: &OperationResult) -> Value {
    let text = serde_json::to_string_pretty(&result.to_json()).unwrap_or_default();
    let mut content = json!({
        "content": [{ "type": "text", "text": text }],
    });
    if result.is_error() {
        content["isError"] = json!(true);
    }
    content
}

async fn read_resource(agent: &SharedAgent, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
    let uri = request
        .param("uri")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params("resources/read requires a string 'uri'"))?;
    if uri != SESSION_STATS_URI {
        return Err(JsonRpcError::invalid_params(format!("Unknown resource: {uri}")));
    }

    let snapshot = snapshot_json(&*agent.lock().await)?;
    Ok(json!({
        "contents": [{
            "uri": SESSION_STATS_URI,
            "mimeType": "application/json",
            "text": snapshot,
        }]
    }))
}

fn snapshot_json(agent: &SessionAgent) -> Result<String, JsonRpcError> {
    serde_json::to_string_pretty(&agent.snapshot())
        .map_err(|e| JsonRpcError::internal_error(format!("Failed to serialize snapshot: {e}")))
}

fn rpc_error(err: ForumError) -> JsonRpcError {
    if err.is_request_error() {
        JsonRpcError::invalid_params(err.to_string())
    } else {
        JsonRpcError::internal_error(err.to_string())
    }
}
