//! WebSocket entrypoint and connection handler.
//!
//! Each connection is one session: it is opened on upgrade and closed when
//! the socket goes away. Every text frame carries one JSON-RPC message.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::mcp::handle_request;
use crate::rpc_protocol::{JsonRpcResponse, parse_request};
use crate::server::GatewayState;
use crate::session_registry::SharedAgent;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: GatewayState) {
    let (session_id, agent) = state.sessions.open_for_connection("websocket").await;
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

    // Forward responses to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            let json = match serde_json::to_string(&response) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to encode response: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Receive frames and run them against the session, in order
    let recv_session = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Some(response) = handle_frame(&agent, &text).await {
                        if tx.send(response).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        debug!(session_id = %recv_session, "WebSocket receive loop ended");
    });

    // If either task exits, abort the other.
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    state.sessions.close(&session_id).await;
    info!(session_id = %session_id, "WebSocket connection closed");
}

async fn handle_frame(agent: &SharedAgent, text: &str) -> Option<JsonRpcResponse> {
    match parse_request(text) {
        Ok(request) => handle_request(agent, request).await,
        Err(error) => {
            warn!(code = error.code, "Received invalid JSON-RPC frame");
            Some(JsonRpcResponse::error(Value::Null, error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc_protocol::JsonRpcError;
    use crate::session_registry::SessionRegistry;
    use crate::test_support::{StaticTransport, settings};

    #[tokio::test]
    async fn frames_are_parsed_and_answered() {
        let registry = SessionRegistry::new(settings(), StaticTransport::empty());
        let (_, agent) = registry.open("websocket").await;

        let response = handle_frame(&agent, r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.id, 9);
        assert!(response.error.is_none());

        let response = handle_frame(&agent, "not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::PARSE_ERROR);

        let note = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(handle_frame(&agent, note).await.is_none());
    }
}
