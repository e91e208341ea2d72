//! ForumLink Gateway HTTP API Server
//!
//! Serves session agents over MCP (streamable HTTP and WebSocket), plus the
//! health and session snapshot endpoints.

pub mod health_api;
pub mod mcp;
pub mod rpc_protocol;
pub mod server;
pub mod session_registry;
pub mod streamable_http;
pub mod ws_server;

#[cfg(test)]
mod test_support;

pub use server::{GatewayState, build_router, start_server};
pub use session_registry::{SessionRegistry, SharedAgent};
