//! Canned upstream for gateway tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use forumlink_agent::{Clock, HttpTransport, UpstreamRequest, UpstreamResponse};
use forumlink_config::ForumSettings;
use forumlink_core::ForumError;
use serde_json::Value;

/// Answers every request with the same body, or 503 when it has none.
pub struct StaticTransport {
    body: Option<Value>,
    calls: AtomicUsize,
}

impl StaticTransport {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            body: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn json(body: Value) -> Arc<Self> {
        Arc::new(Self {
            body: Some(body),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for StaticTransport {
    async fn execute(&self, _request: UpstreamRequest) -> Result<UpstreamResponse, ForumError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.body {
            Some(body) => UpstreamResponse {
                status: 200,
                status_text: "OK".into(),
                body: body.to_string(),
            },
            None => UpstreamResponse {
                status: 503,
                status_text: "Service Unavailable".into(),
                body: String::new(),
            },
        })
    }
}

pub fn settings() -> ForumSettings {
    ForumSettings::new("https://forum.example.com", "test-key", "system")
}

/// A clock the test moves by hand.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn clock(&self) -> Clock {
        let now = self.now.clone();
        Arc::new(move || *now.lock().unwrap())
    }
}
