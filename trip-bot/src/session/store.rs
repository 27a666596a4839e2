//! Per-user session storage.
//!
//! Sessions live in a moka cache keyed by chat-platform id. Each entry is
//! behind its own async mutex, so one user's requests are serialised while
//! different users proceed in parallel. Sessions idle for longer than
//! `SessionConfig::idle_timeout` are dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use tokio::sync::Mutex;

use crate::domain::ExternalId;

use super::Session;

/// A session handle. Lock it for the whole read-modify-write of a request.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Configuration for session storage.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long an untouched session is kept.
    pub idle_timeout: Duration,

    /// Maximum number of live sessions.
    pub max_sessions: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 100_000,
        }
    }
}

impl SessionConfig {
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_max_sessions(mut self, n: u64) -> Self {
        self.max_sessions = n;
        self
    }
}

/// Owner of all live sessions.
#[derive(Clone)]
pub struct SessionStore {
    sessions: MokaCache<ExternalId, SessionHandle>,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = MokaCache::builder()
            .time_to_idle(config.idle_timeout)
            .max_capacity(config.max_sessions)
            .build();

        Self { sessions }
    }

    /// The user's session, created lazily as `Idle` on first use.
    pub async fn get(&self, user: ExternalId, now: DateTime<Utc>) -> SessionHandle {
        self.sessions
            .get_with(user, async move { Arc::new(Mutex::new(Session::new(now))) })
            .await
    }

    /// The user's session if one is live.
    pub async fn peek(&self, user: ExternalId) -> Option<SessionHandle> {
        self.sessions.get(&user).await
    }

    /// Drop the user's session.
    ///
    /// Callers holding the session lock should also reset the guarded value,
    /// since requests already waiting on the lock still see the old handle.
    pub async fn remove(&self, user: ExternalId) {
        self.sessions.invalidate(&user).await;
    }

    /// Number of live sessions (approximate, for monitoring).
    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ConvState;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 23, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn sessions_are_created_lazily_and_reused() {
        let store = SessionStore::default();
        assert!(store.peek(ExternalId(1)).await.is_none());

        let first = store.get(ExternalId(1), now()).await;
        first.lock().await.restart(now());

        let again = store.get(ExternalId(1), now()).await;
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.lock().await.state(), ConvState::SelectingFrom);
    }

    #[tokio::test]
    async fn users_are_independent() {
        let store = SessionStore::default();
        let a = store.get(ExternalId(1), now()).await;
        let b = store.get(ExternalId(2), now()).await;

        // Holding one user's lock does not block another user
        let _guard = a.lock().await;
        assert!(b.try_lock().is_ok());
    }

    #[tokio::test]
    async fn remove_forgets_session() {
        let store = SessionStore::default();
        store.get(ExternalId(1), now()).await.lock().await.restart(now());
        store.remove(ExternalId(1)).await;

        assert!(store.peek(ExternalId(1)).await.is_none());
        let fresh = store.get(ExternalId(1), now()).await;
        assert_eq!(fresh.lock().await.state(), ConvState::Idle);
    }

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.idle_timeout, Duration::from_secs(1800));
    }
}
