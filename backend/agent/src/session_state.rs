//! Per-session mutable state: request counters and the topic cache slot.

use chrono::{DateTime, Utc};

use crate::cache::TopicCache;

/// Active state of one client session. Created zero-valued and dropped with
/// the session; only the owning agent mutates it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    request_count: u64,
    last_request_time: Option<DateTime<Utc>>,
    cache: TopicCache,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one upstream attempt. Runs before the network call, so failed
    /// calls are counted too. Returns the new count.
    pub fn record_request(&mut self, now: DateTime<Utc>) -> u64 {
        self.request_count += 1;
        self.last_request_time = Some(now);
        self.request_count
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    pub fn last_request_time(&self) -> Option<DateTime<Utc>> {
        self.last_request_time
    }

    pub fn cache(&self) -> &TopicCache {
        &self.cache
    }

    pub(crate) fn cache_mut(&mut self) -> &mut TopicCache {
        &mut self.cache
    }
}
