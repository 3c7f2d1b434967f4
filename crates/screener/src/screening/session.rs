//! Keyed storage for in-progress screening sessions with time-boxed expiry.
//!
//! The trait exists so the in-memory backing used here and in tests can be
//! swapped for an external keyed store without touching the orchestrator.
//! Concurrent writes to the same id are last-write-wins; distinct ids never
//! interfere.

use super::domain::ScreeningSession;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Storage abstraction for screening sessions.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: &str) -> Result<Option<ScreeningSession>, SessionStoreError>;
    fn put(&self, session: ScreeningSession) -> Result<(), SessionStoreError>;
    fn expire(&self, id: &str) -> Result<(), SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local backing with lazy TTL eviction. Sessions are lost on
/// restart, which is acceptable for this scope.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, ScreeningSession>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    /// TTL is measured from the most recent write to a session, so touching
    /// a conversation keeps it alive for another full horizon.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn with_ttl_hours(hours: u64) -> Self {
        Self::new(Duration::hours(hours as i64))
    }

    fn is_expired(&self, session: &ScreeningSession) -> bool {
        Utc::now() - session.last_updated > self.ttl
    }

    /// Drop every expired session, returning how many were removed. Intended
    /// for a periodic background sweep; `get` also evicts lazily.
    pub fn prune_expired(&self) -> usize {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let before = guard.len();
        guard.retain(|_, session| Utc::now() - session.last_updated <= self.ttl);
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &str) -> Result<Option<ScreeningSession>, SessionStoreError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        match guard.get(id) {
            Some(session) if self.is_expired(session) => {
                guard.remove(id);
                Ok(None)
            }
            Some(session) => Ok(Some(session.clone())),
            None => Ok(None),
        }
    }

    fn put(&self, session: ScreeningSession) -> Result<(), SessionStoreError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    fn expire(&self, id: &str) -> Result<(), SessionStoreError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aged_session(age: Duration) -> ScreeningSession {
        let mut session = ScreeningSession::new();
        session.last_updated = Utc::now() - age;
        session
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = InMemorySessionStore::with_ttl_hours(24);
        let session = ScreeningSession::new();
        let id = session.id.clone();

        store.put(session.clone()).expect("put succeeds");
        let loaded = store.get(&id).expect("get succeeds");
        assert_eq!(loaded, Some(session));
    }

    #[test]
    fn unknown_id_is_absent_not_an_error() {
        let store = InMemorySessionStore::with_ttl_hours(24);
        assert_eq!(store.get("no-such-session").expect("get succeeds"), None);
    }

    #[test]
    fn get_evicts_sessions_past_the_ttl() {
        let store = InMemorySessionStore::new(Duration::hours(24));
        let stale = aged_session(Duration::hours(25));
        let id = stale.id.clone();

        store.put(stale).expect("put succeeds");
        assert_eq!(store.get(&id).expect("get succeeds"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn rewriting_a_session_restarts_its_ttl() {
        let store = InMemorySessionStore::new(Duration::hours(24));
        let mut session = aged_session(Duration::hours(23));
        let id = session.id.clone();
        store.put(session.clone()).expect("put succeeds");

        // A fresh write supersedes the earlier horizon.
        session.last_updated = Utc::now();
        store.put(session).expect("put succeeds");
        assert!(store.get(&id).expect("get succeeds").is_some());
    }

    #[test]
    fn prune_removes_only_expired_entries() {
        let store = InMemorySessionStore::new(Duration::hours(24));
        let live = ScreeningSession::new();
        let live_id = live.id.clone();
        store.put(live).expect("put succeeds");
        store
            .put(aged_session(Duration::hours(30)))
            .expect("put succeeds");

        assert_eq!(store.prune_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get(&live_id).expect("get succeeds").is_some());
    }

    #[test]
    fn expire_removes_immediately() {
        let store = InMemorySessionStore::with_ttl_hours(24);
        let session = ScreeningSession::new();
        let id = session.id.clone();
        store.put(session).expect("put succeeds");

        store.expire(&id).expect("expire succeeds");
        assert_eq!(store.get(&id).expect("get succeeds"), None);
    }
}
