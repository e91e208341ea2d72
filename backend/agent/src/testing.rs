//! Scripted transport and fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use forumlink_config::ForumSettings;
use forumlink_core::ForumError;
use serde_json::{Value, json};

use crate::agent::{Clock, SessionAgent};
use crate::upstream::{HttpTransport, UpstreamRequest, UpstreamResponse};

enum Step {
    Reply(Result<UpstreamResponse, ForumError>),
    Hang,
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_raw(&self, status: u16, status_text: &str, body: &str) {
        self.steps.lock().unwrap().push_back(Step::Reply(Ok(UpstreamResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        })));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_raw(status, "OK", &body.to_string());
    }

    pub fn push_status(&self, status: u16, status_text: &str) {
        self.push_raw(status, status_text, "");
    }

    pub fn push_error(&self, err: ForumError) {
        self.steps.lock().unwrap().push_back(Step::Reply(Err(err)));
    }

    /// The next request never completes; the caller has to drop it.
    pub fn push_hang(&self) {
        self.steps.lock().unwrap().push_back(Step::Hang);
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Request URLs relative to the test base URL.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.url.trim_start_matches(BASE_URL).to_string())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ForumError> {
        self.requests.lock().unwrap().push(request);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(outcome)) => outcome,
            Some(Step::Hang) => std::future::pending().await,
            None => Err(ForumError::upstream(599, "No scripted response")),
        }
    }
}

pub const BASE_URL: &str = "https://forum.example.com";

pub fn settings() -> ForumSettings {
    ForumSettings::new(BASE_URL, "test-key", "system")
}

/// A clock the test can move forward.
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
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    pub fn clock(&self) -> Clock {
        let now = self.now.clone();
        Arc::new(move || *now.lock().unwrap())
    }
}

pub fn agent(transport: Arc<ScriptedTransport>, clock: &ManualClock) -> SessionAgent {
    SessionAgent::with_transport("test-session", &settings(), transport).with_clock(clock.clock())
}

pub fn latest_topics_body(count: usize) -> Value {
    let topics: Vec<Value> = (1..=count as u64)
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Topic {id}"),
                "posts_count": id * 2,
                "views": id * 10,
                "like_count": id,
                "created_at": "2024-04-01T10:00:00.000Z",
                "last_posted_at": "2024-04-02T10:00:00.000Z",
                "category_id": 4,
                "slug": format!("topic-{id}"),
                "excerpt": "Short <em>intro</em>",
            })
        })
        .collect();
    json!({ "topic_list": { "topics": topics } })
}

pub fn latest_posts_body(count: usize) -> Value {
    let posts: Vec<Value> = (1..=count as u64)
        .map(|id| {
            json!({
                "id": 100 + id,
                "post_number": id,
                "cooked": "<p>Hello <b>world</b></p>",
                "username": "alice",
                "topic_title": "Welcome",
                "topic_id": 7,
                "topic_slug": "welcome",
                "created_at": "2024-04-03T09:00:00.000Z",
            })
        })
        .collect();
    json!({ "latest_posts": posts })
}
