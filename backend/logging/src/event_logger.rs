//! Session Event Logger
//!
//! Structured session events (operation calls, upstream calls, failures,
//! session lifecycle) emitted on the `session_events` tracing target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionOpened {
        transport: String,
    },
    SessionClosed {
        request_count: u64,
    },
    OperationCall {
        operation: String,
        arguments_json: String,
    },
    UpstreamCall {
        path: String,
        status: Option<u16>,
        request_count: u64,
    },
    OperationFailed {
        operation: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redact and emit one event, returning the entry that was logged.
    pub fn log_event(session_id: &str, mut event: SessionEvent) -> EventLogEntry {
        match &mut event {
            SessionEvent::OperationCall { arguments_json, .. } => {
                *arguments_json = redact_sensitive_data(arguments_json);
            }
            SessionEvent::UpstreamCall { path, .. } => {
                *path = redact_sensitive_data(path);
            }
            SessionEvent::OperationFailed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            SessionEvent::SessionOpened { .. } | SessionEvent::SessionClosed { .. } => {}
        }

        let entry = EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        };

        let payload = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "session_events", session_id = %entry.session_id, event = %payload, "Session event");
        entry
    }
}
