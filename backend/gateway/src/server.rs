//! Main HTTP gateway server and routing.

use anyhow::Result;
use axum::{
    Router,
    http::HeaderName,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use crate::health_api;
use crate::session_registry::SessionRegistry;
use crate::streamable_http::{self, SESSION_HEADER};
use crate::ws_server;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub sessions: SessionRegistry,
    pub started_at: DateTime<Utc>,
}

impl GatewayState {
    pub fn new(sessions: SessionRegistry) -> Self {
        Self {
            sessions,
            started_at: Utc::now(),
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    let cors = CorsLayer::permissive().expose_headers([HeaderName::from_static(SESSION_HEADER)]);

    Router::new()
        .route(
            "/mcp",
            post(streamable_http::post_mcp).delete(streamable_http::delete_mcp),
        )
        .route("/ws", get(ws_server::ws_handler))
        .route("/health", get(health_api::get_health))
        .route("/api/sessions/:id", get(health_api::get_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the gateway and serves until the process is stopped.
///
/// Idle streamable HTTP sessions are swept in the background while it runs.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let sweeper = state.sessions.spawn_idle_sweeper();
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway HTTP server listening on {}", addr);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    served?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
