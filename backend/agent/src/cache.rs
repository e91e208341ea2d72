//! Single-slot TTL cache for the latest-topics listing.
//!
//! Expiry is observed lazily when the slot is read; nothing runs in the
//! background. Expired topics are never served.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use forumlink_core::{CacheStatus, Topic};

/// Topics and their expiry, always stored together.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub topics: Arc<Vec<Topic>>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(Arc<Vec<Topic>>),
    Miss(MissReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    Bypassed,
    Empty,
    Expired,
}

#[derive(Debug, Clone, Default)]
pub struct TopicCache {
    slot: Option<CacheEntry>,
}

impl TopicCache {
    pub fn status(&self, now: DateTime<Utc>) -> CacheStatus {
        match &self.slot {
            None => CacheStatus::Empty,
            Some(entry) if now < entry.expires_at => CacheStatus::Valid,
            Some(_) => CacheStatus::Expired,
        }
    }

    /// A hit requires `use_cache` and a slot that has not expired at `now`.
    pub fn get(&self, use_cache: bool, now: DateTime<Utc>) -> CacheLookup {
        if !use_cache {
            return CacheLookup::Miss(MissReason::Bypassed);
        }
        match (&self.slot, self.status(now)) {
            (Some(entry), CacheStatus::Valid) => CacheLookup::Hit(entry.topics.clone()),
            (_, CacheStatus::Expired) => CacheLookup::Miss(MissReason::Expired),
            _ => CacheLookup::Miss(MissReason::Empty),
        }
    }

    /// Replace whatever was cached; the new entry is valid until `now + ttl`,
    /// saturating at the latest representable instant.
    pub fn store(&mut self, topics: Arc<Vec<Topic>>, now: DateTime<Utc>, ttl: Duration) {
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.slot = Some(CacheEntry { topics, expires_at });
    }

    pub fn topics(&self) -> Option<&Arc<Vec<Topic>>> {
        self.slot.as_ref().map(|e| &e.topics)
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.slot.as_ref().map(|e| e.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn topic(id: u64) -> Topic {
        Topic {
            id,
            title: format!("t{id}"),
            posts_count: 1,
            views: 1,
            like_count: 0,
            created_at: None,
            last_posted_at: None,
            category_id: None,
            slug: String::new(),
            excerpt: String::new(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_cache_misses() {
        let cache = TopicCache::default();
        assert_eq!(cache.status(t0()), CacheStatus::Empty);
        assert_eq!(cache.get(true, t0()), CacheLookup::Miss(MissReason::Empty));
        assert!(cache.expiry().is_none());
    }

    #[test]
    fn valid_until_expiry_instant() {
        let mut cache = TopicCache::default();
        cache.store(Arc::new(vec![topic(1)]), t0(), Duration::minutes(5));

        let just_before = t0() + Duration::minutes(5) - Duration::milliseconds(1);
        assert!(matches!(cache.get(true, just_before), CacheLookup::Hit(_)));

        let at_expiry = t0() + Duration::minutes(5);
        assert_eq!(cache.status(at_expiry), CacheStatus::Expired);
        assert_eq!(cache.get(true, at_expiry), CacheLookup::Miss(MissReason::Expired));
    }

    #[test]
    fn bypass_misses_even_when_valid() {
        let mut cache = TopicCache::default();
        cache.store(Arc::new(vec![topic(1)]), t0(), Duration::minutes(5));
        assert_eq!(cache.get(false, t0()), CacheLookup::Miss(MissReason::Bypassed));
    }

    #[test]
    fn store_overwrites_previous_slot() {
        let mut cache = TopicCache::default();
        cache.store(Arc::new(vec![topic(1)]), t0(), Duration::minutes(5));
        let later = t0() + Duration::minutes(10);
        cache.store(Arc::new(vec![topic(2), topic(3)]), later, Duration::minutes(5));

        assert_eq!(cache.topics().unwrap().len(), 2);
        assert_eq!(cache.expiry(), Some(later + Duration::minutes(5)));
        assert_eq!(cache.status(later), CacheStatus::Valid);
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_overflowing() {
        let mut cache = TopicCache::default();
        cache.store(Arc::new(vec![topic(1)]), t0(), Duration::MAX);

        assert_eq!(cache.expiry(), Some(DateTime::<Utc>::MAX_UTC));
        assert_eq!(cache.status(t0() + Duration::days(365)), CacheStatus::Valid);
    }
}
