//! Active session registry.
//!
//! Maps session ids to their agents. The map lock only guards membership;
//! each agent sits behind its own mutex so calls within one session run one
//! at a time while sessions proceed independently.
//!
//! Sessions that are not tied to a live connection are evicted once they sit
//! idle for longer than the idle timeout.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use forumlink_agent::{Clock, HttpTransport, SessionAgent, system_clock};
use forumlink_config::ForumSettings;
use forumlink_config::defaults::DEFAULT_SESSION_IDLE_SECS;
use forumlink_core::SessionSnapshot;
use forumlink_logging::{EventLogger, SessionEvent};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

pub type SessionId = String;
pub type SharedAgent = Arc<Mutex<SessionAgent>>;

/// Upper bound on how often the background sweep runs.
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

struct SessionEntry {
    agent: SharedAgent,
    last_active: DateTime<Utc>,
    /// Connection-bound sessions are only removed by `close`.
    evictable: bool,
}

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    settings: Arc<ForumSettings>,
    transport: Arc<dyn HttpTransport>,
    clock: Clock,
    idle_timeout: Duration,
}

impl SessionRegistry {
    /// All sessions share one transport (and its connection pool) but own
    /// their state.
    pub fn new(settings: ForumSettings, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            settings: Arc::new(settings),
            transport,
            clock: system_clock(),
            idle_timeout: Duration::seconds(DEFAULT_SESSION_IDLE_SECS as i64),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: std::time::Duration) -> Self {
        self.idle_timeout = Duration::from_std(idle_timeout).unwrap_or(Duration::MAX);
        self
    }

    pub fn settings(&self) -> &ForumSettings {
        &self.settings
    }

    /// Create a fresh session with zeroed counters and an empty cache.
    /// It is evicted after sitting idle for the idle timeout.
    pub async fn open(&self, transport: &str) -> (SessionId, SharedAgent) {
        self.insert(transport, true).await
    }

    /// Like [`open`](Self::open), but the session lives until `close`.
    pub async fn open_for_connection(&self, transport: &str) -> (SessionId, SharedAgent) {
        self.insert(transport, false).await
    }

    async fn insert(&self, transport: &str, evictable: bool) -> (SessionId, SharedAgent) {
        self.evict_idle().await;

        let session_id = Uuid::new_v4().to_string();
        let agent = SessionAgent::with_transport(session_id.clone(), &self.settings, self.transport.clone())
            .with_clock(self.clock.clone());
        let agent = Arc::new(Mutex::new(agent));

        let entry = SessionEntry {
            agent: agent.clone(),
            last_active: (self.clock)(),
            evictable,
        };
        self.sessions.write().await.insert(session_id.clone(), entry);

        info!(session_id = %session_id, transport, "Session opened");
        EventLogger::log_event(
            &session_id,
            SessionEvent::SessionOpened {
                transport: transport.to_string(),
            },
        );
        (session_id, agent)
    }

    /// Look up a session for use and mark it active.
    pub async fn get(&self, session_id: &str) -> Option<SharedAgent> {
        let now = (self.clock)();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(session_id)?;
        entry.last_active = now;
        Some(entry.agent.clone())
    }

    /// Mark a session active without using it. Returns false if unknown.
    pub async fn touch(&self, session_id: &str) -> bool {
        self.get(session_id).await.is_some()
    }

    /// Drop a session and its state. Returns false if it was not registered.
    pub async fn close(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        let Some(entry) = removed else {
            return false;
        };

        let request_count = entry.agent.lock().await.state().request_count();
        info!(session_id, request_count, "Session closed");
        EventLogger::log_event(session_id, SessionEvent::SessionClosed { request_count });
        true
    }

    /// Remove every evictable session idle for at least the idle timeout.
    pub async fn evict_idle(&self) -> Vec<SessionId> {
        let now = (self.clock)();
        let evicted: Vec<(SessionId, SharedAgent)> = {
            let mut sessions = self.sessions.write().await;
            let idle: Vec<SessionId> = sessions
                .iter()
                .filter(|(_, e)| e.evictable && now - e.last_active >= self.idle_timeout)
                .map(|(id, _)| id.clone())
                .collect();
            idle.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|e| (id, e.agent)))
                .collect()
        };

        let mut ids = Vec::with_capacity(evicted.len());
        for (session_id, agent) in evicted {
            let request_count = agent.lock().await.state().request_count();
            info!(session_id = %session_id, request_count, "Idle session evicted");
            EventLogger::log_event(&session_id, SessionEvent::SessionClosed { request_count });
            ids.push(session_id);
        }
        ids
    }

    /// Run [`evict_idle`](Self::evict_idle) periodically until the handle is aborted.
    pub fn spawn_idle_sweeper(&self) -> JoinHandle<()> {
        let registry = self.clone();
        let period = self
            .idle_timeout
            .to_std()
            .unwrap_or(SWEEP_INTERVAL)
            .clamp(std::time::Duration::from_secs(1), SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = registry.evict_idle().await;
                if !evicted.is_empty() {
                    debug!(count = evicted.len(), "Idle sweep removed sessions");
                }
            }
        })
    }

    /// Read-only view; does not count as activity.
    pub async fn snapshot(&self, session_id: &str) -> Option<SessionSnapshot> {
        let agent = self.sessions.read().await.get(session_id)?.agent.clone();
        let agent = agent.lock().await;
        Some(agent.snapshot())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ManualClock, StaticTransport, settings};

    fn idle_registry(clock: &ManualClock) -> SessionRegistry {
        SessionRegistry::new(settings(), StaticTransport::empty())
            .with_clock(clock.clock())
            .with_idle_timeout(std::time::Duration::from_secs(600))
    }

    #[tokio::test]
    async fn open_close_lifecycle() {
        let registry = SessionRegistry::new(settings(), StaticTransport::empty());
        assert!(registry.is_empty().await);

        let (a, _) = registry.open("test").await;
        let (b, _) = registry.open("test").await;
        assert_ne!(a, b);
        assert_eq!(registry.len().await, 2);

        assert!(registry.close(&a).await);
        assert!(!registry.close(&a).await);
        assert!(registry.get(&a).await.is_none());
        assert!(registry.get(&b).await.is_some());
    }

    #[tokio::test]
    async fn new_session_snapshot_is_zeroed() {
        let registry = SessionRegistry::new(settings(), StaticTransport::empty());
        let (id, _) = registry.open("test").await;

        let snap = registry.snapshot(&id).await.unwrap();
        assert_eq!(snap.session_id, id);
        assert_eq!(snap.request_count, 0);
        assert_eq!(snap.cache_status, forumlink_core::CacheStatus::Empty);
        assert!(registry.snapshot("missing").await.is_none());
    }

    #[tokio::test]
    async fn idle_session_is_evicted_and_active_one_kept() {
        let clock = ManualClock::new();
        let registry = idle_registry(&clock);
        let (active, _) = registry.open("http").await;
        let (idle, _) = registry.open("http").await;

        clock.advance(Duration::minutes(6));
        assert!(registry.get(&active).await.is_some());
        clock.advance(Duration::minutes(6));

        assert_eq!(registry.evict_idle().await, vec![idle.clone()]);
        assert!(registry.get(&idle).await.is_none());
        assert!(registry.get(&active).await.is_some());
        assert!(!registry.close(&idle).await);
    }

    #[tokio::test]
    async fn snapshot_does_not_count_as_activity() {
        let clock = ManualClock::new();
        let registry = idle_registry(&clock);
        let (id, _) = registry.open("http").await;

        clock.advance(Duration::minutes(9));
        assert!(registry.snapshot(&id).await.is_some());
        clock.advance(Duration::minutes(1));

        assert_eq!(registry.evict_idle().await, vec![id]);
    }

    #[tokio::test]
    async fn open_sweeps_idle_sessions_but_not_connections() {
        let clock = ManualClock::new();
        let registry = idle_registry(&clock);
        let (stale, _) = registry.open("http").await;
        let (socket, _) = registry.open_for_connection("websocket").await;

        clock.advance(Duration::hours(2));
        let (fresh, _) = registry.open("http").await;

        assert!(registry.get(&stale).await.is_none());
        assert!(registry.get(&socket).await.is_some());
        assert!(registry.get(&fresh).await.is_some());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn touch_reports_unknown_sessions() {
        let clock = ManualClock::new();
        let registry = idle_registry(&clock);
        let (id, _) = registry.open("http").await;
        assert!(registry.touch(&id).await);
        assert!(!registry.touch("missing").await);
    }
}
