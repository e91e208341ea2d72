//! The session agent: owns one session's state and dispatches operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use forumlink_config::ForumSettings;
use forumlink_core::{ForumError, OperationRequest, OperationResult, SessionSnapshot};
use forumlink_logging::{EventLogger, SessionEvent};
use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::{self, OperationKind};
use crate::session_state::SessionState;
use crate::upstream::{HttpTransport, ReqwestTransport, UpstreamClient};

/// Source of "now"; swapped out in tests to move time without sleeping.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// One agent per session. Calls take `&mut self`, so a host that shares an
/// agent must serialize access (the gateway holds a mutex per session).
pub struct SessionAgent {
    session_id: String,
    upstream: UpstreamClient,
    state: SessionState,
    cache_ttl: chrono::Duration,
    clock: Clock,
}

impl SessionAgent {
    /// Build an agent with its own reqwest transport.
    pub fn new(session_id: impl Into<String>, settings: &ForumSettings) -> Result<Self, ForumError> {
        let transport = Arc::new(ReqwestTransport::new(settings.timeout)?);
        Ok(Self::with_transport(session_id, settings, transport))
    }

    /// Build an agent over a shared transport.
    pub fn with_transport(
        session_id: impl Into<String>,
        settings: &ForumSettings,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let cache_ttl =
            chrono::Duration::from_std(settings.cache_ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            session_id: session_id.into(),
            upstream: UpstreamClient::new(settings, transport),
            state: SessionState::new(),
            cache_ttl,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub(crate) fn cache_ttl(&self) -> chrono::Duration {
        self.cache_ttl
    }

    pub(crate) fn base_url(&self) -> &str {
        self.upstream.base_url()
    }

    /// Counters and cache status as of now. Never touches the network.
    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.now();
        let cache = self.state.cache();
        SessionSnapshot {
            session_id: self.session_id.clone(),
            request_count: self.state.request_count(),
            last_request_time: self.state.last_request_time(),
            cache_status: cache.status(now),
            cache_expiry: cache.expiry(),
            cached_topic_count: cache.topics().map_or(0, |t| t.len()),
        }
    }

    /// Record the attempt, then call upstream.
    ///
    /// The count goes up before the request is sent, so failed and
    /// abandoned calls are counted as attempts.
    pub(crate) async fn fetch(&mut self, path: &str) -> Result<Value, ForumError> {
        let now = self.now();
        let request_count = self.state.record_request(now);

        let outcome = self.upstream.call(path, None).await;

        let status = match &outcome {
            Ok(_) => Some(200),
            Err(ForumError::Upstream { status, .. }) => Some(*status),
            Err(_) => None,
        };
        EventLogger::log_event(
            &self.session_id,
            SessionEvent::UpstreamCall {
                path: path.to_string(),
                status,
                request_count,
            },
        );
        outcome
    }

    /// Validate and run one operation.
    ///
    /// `Err` is reserved for request-level problems (unknown operation, bad
    /// parameters) and is returned before any upstream traffic. Everything
    /// that goes wrong inside a handler comes back as a failure result.
    pub async fn call(&mut self, request: OperationRequest) -> Result<OperationResult, ForumError> {
        let spec = registry::find(&request.name)
            .ok_or_else(|| ForumError::UnknownOperation(request.name.clone()))?;
        let params = spec.validate(&request.params)?;

        EventLogger::log_event(
            &self.session_id,
            SessionEvent::OperationCall {
                operation: spec.name.to_string(),
                arguments_json: Value::Object(request.params.clone()).to_string(),
            },
        );
        debug!(session_id = %self.session_id, operation = spec.name, "Dispatching operation");

        let outcome = match spec.kind {
            OperationKind::LatestTopics => self.get_latest_topics(&params).await,
            OperationKind::SearchPosts => self.search_posts(&params).await,
            OperationKind::GetTopic => self.get_topic(&params).await,
            OperationKind::RecentPosts => self.get_recent_posts(&params).await,
        };

        Ok(match outcome {
            Ok(data) => OperationResult::success(data),
            Err(err) => {
                warn!(session_id = %self.session_id, operation = spec.name, error = %err, "Operation failed");
                EventLogger::log_event(
                    &self.session_id,
                    SessionEvent::OperationFailed {
                        operation: spec.name.to_string(),
                        error_msg: err.to_string(),
                    },
                );
                OperationResult::failure(format!("Error {}: {}", spec.action, err))
            }
        })
    }
}
