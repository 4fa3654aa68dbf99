//! Session storage: the capability trait and the in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use super::event::Event;
use super::record::{Session, State};
use crate::error::{AgentError, Result};

/// Exclusive owner of session records.
///
/// Lookups return snapshots. Mutations on an unknown id are silent no-ops.
pub trait SessionStore: Send + Sync {
    /// Create a session with a fresh id never issued by this store. Always succeeds.
    fn create_session(&self, user_id: &str, app_name: &str, initial_state: Option<State>)
        -> Session;

    /// Create a session under a caller-chosen id. Ids of deleted sessions
    /// are not reissued.
    fn create_session_with_id(
        &self,
        session_id: &str,
        user_id: &str,
        app_name: &str,
        initial_state: Option<State>,
    ) -> Result<Session>;

    fn get_session(&self, session_id: &str) -> Option<Session>;

    /// Append to the tail of the event log and refresh `last_updated`.
    fn append_event(&self, session_id: &str, event: Event);

    /// Shallow-merge `partial` into the session state and refresh `last_updated`.
    fn patch_state(&self, session_id: &str, partial: State);

    /// Remove a session. Returns whether it existed.
    fn delete_session(&self, session_id: &str) -> bool;

    /// One user's sessions for one app, oldest update first.
    fn list_sessions(&self, app_name: &str, user_id: &str) -> Vec<Session>;
}

/// Process-lifetime session store backed by a map.
///
/// Each operation holds the map lock for its own duration only. Turn-level
/// ordering across several operations is the runner's job.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<Sessions>,
}

#[derive(Debug, Default)]
struct Sessions {
    live: HashMap<String, Session>,
    /// Every id handed out, including deleted ones.
    issued: HashSet<String>,
}

impl Sessions {
    fn insert(&mut self, session: Session) {
        self.issued.insert(session.id().to_string());
        self.live.insert(session.id().to_string(), session);
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.read().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().live.is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Sessions> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Sessions> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for InMemorySessionStore {
    fn create_session(
        &self,
        user_id: &str,
        app_name: &str,
        initial_state: Option<State>,
    ) -> Session {
        let mut sessions = self.write();
        let mut session = Session::new(user_id, app_name, initial_state.unwrap_or_default());
        while sessions.issued.contains(session.id()) {
            session = Session::new(user_id, app_name, session.state().clone());
        }
        info!(session_id = session.id(), user_id, app_name, "session created");
        sessions.insert(session.clone());
        session
    }

    fn create_session_with_id(
        &self,
        session_id: &str,
        user_id: &str,
        app_name: &str,
        initial_state: Option<State>,
    ) -> Result<Session> {
        if session_id.trim().is_empty() {
            return Err(AgentError::InvalidArgument("session id must not be empty".into()));
        }
        let mut sessions = self.write();
        if sessions.issued.contains(session_id) {
            return Err(AgentError::SessionExists(session_id.to_string()));
        }
        let session =
            Session::with_id(session_id, user_id, app_name, initial_state.unwrap_or_default());
        info!(session_id, user_id, app_name, "session created");
        sessions.insert(session.clone());
        Ok(session)
    }

    fn get_session(&self, session_id: &str) -> Option<Session> {
        self.read().live.get(session_id).cloned()
    }

    fn append_event(&self, session_id: &str, event: Event) {
        match self.write().live.get_mut(session_id) {
            Some(session) => session.push_event(event),
            None => debug!(session_id, "append_event: unknown session, skipped"),
        }
    }

    fn patch_state(&self, session_id: &str, partial: State) {
        match self.write().live.get_mut(session_id) {
            Some(session) => session.merge_state(partial),
            None => debug!(session_id, "patch_state: unknown session, skipped"),
        }
    }

    fn delete_session(&self, session_id: &str) -> bool {
        let removed = self.write().live.remove(session_id).is_some();
        if removed {
            info!(session_id, "session deleted");
        }
        removed
    }

    fn list_sessions(&self, app_name: &str, user_id: &str) -> Vec<Session> {
        let mut found: Vec<Session> = self
            .read()
            .live
            .values()
            .filter(|s| s.app_name() == app_name && s.user_id() == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.last_updated());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: serde_json::Value) -> State {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn create_without_state_starts_empty() {
        let store = InMemorySessionStore::new();
        let session = store.create_session("u1", "app", None);
        assert!(session.state().is_empty());
        assert!(session.events().is_empty());
        assert_eq!(store.get_session(session.id()), Some(session));
    }

    #[test]
    fn create_with_id_rejects_duplicates() {
        let store = InMemorySessionStore::new();
        store
            .create_session_with_id("local-session", "u1", "app", None)
            .unwrap();
        let err = store
            .create_session_with_id("local-session", "u2", "app", None)
            .unwrap_err();
        assert!(matches!(err, AgentError::SessionExists(id) if id == "local-session"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn deleted_ids_are_not_reissued() {
        let store = InMemorySessionStore::new();
        store
            .create_session_with_id("local-session", "u1", "app", None)
            .unwrap();
        assert!(store.delete_session("local-session"));

        let err = store
            .create_session_with_id("local-session", "u2", "app", None)
            .unwrap_err();
        assert!(matches!(err, AgentError::SessionExists(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn create_with_blank_id_is_invalid() {
        let store = InMemorySessionStore::new();
        assert!(matches!(
            store.create_session_with_id(" ", "u1", "app", None),
            Err(AgentError::InvalidArgument(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn snapshots_are_detached() {
        let store = InMemorySessionStore::new();
        let mut snapshot = store.create_session("u1", "app", None);
        snapshot.push_event(Event::user("local only"));
        let stored = store.get_session(snapshot.id()).unwrap();
        assert!(stored.events().is_empty());
    }

    #[test]
    fn append_refreshes_last_updated() {
        let store = InMemorySessionStore::new();
        let session = store.create_session("u1", "app", None);
        let before = session.last_updated();
        store.append_event(session.id(), Event::user("hi"));
        let after = store.get_session(session.id()).unwrap().last_updated();
        assert!(after >= before);
    }

    #[test]
    fn delete_and_list() {
        let store = InMemorySessionStore::new();
        let a = store.create_session("u1", "app", None);
        let b = store.create_session("u1", "app", Some(state(json!({"k": 1}))));
        store.create_session("u2", "app", None);
        store.create_session("u1", "other", None);

        let ids: Vec<String> = store
            .list_sessions("app", "u1")
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a.id().to_string()) && ids.contains(&b.id().to_string()));

        assert!(store.delete_session(a.id()));
        assert!(!store.delete_session(a.id()));
        assert!(store.get_session(a.id()).is_none());
        assert_eq!(store.list_sessions("app", "u1").len(), 1);
    }
}
