//! ForumLink Agent
//!
//! Session-scoped forum agent: the upstream client, the projections from raw
//! forum JSON, the per-session topic cache and the operation dispatcher.

pub mod agent;
pub mod cache;
mod handlers;
pub mod projector;
pub mod registry;
pub mod session_state;
pub mod upstream;

#[cfg(test)]
mod testing;

pub use agent::{Clock, SessionAgent, system_clock};
pub use cache::{CacheLookup, MissReason, TopicCache};
pub use registry::{OperationKind, OperationSpec, ParamValues, find, operation_names, operations};
pub use session_state::SessionState;
pub use upstream::{HttpTransport, ReqwestTransport, UpstreamClient, UpstreamRequest, UpstreamResponse};
