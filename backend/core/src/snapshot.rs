use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observable state of the latest-topics cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Empty,
    Valid,
    Expired,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Empty => "empty",
            CacheStatus::Valid => "valid",
            CacheStatus::Expired => "expired",
        }
    }
}

/// Read-only view of a session's counters and cache, computed at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub request_count: u64,
    pub last_request_time: Option<DateTime<Utc>>,
    pub cache_status: CacheStatus,
    pub cache_expiry: Option<DateTime<Utc>>,
    pub cached_topic_count: usize,
}
