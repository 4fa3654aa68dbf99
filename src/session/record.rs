//! The session record: one conversation thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event::Event;

/// Caller-owned key/value state attached to a session.
pub type State = Map<String, Value>;

/// One conversation thread: state plus an append-only event log.
///
/// Values handed out by a [`SessionStore`](super::SessionStore) are
/// snapshots; changing them does not change the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    app_name: String,
    user_id: String,
    state: State,
    events: Vec<Event>,
    last_updated: DateTime<Utc>,
}

impl Session {
    /// A detached session with a fresh random id.
    pub fn new(user_id: impl Into<String>, app_name: impl Into<String>, state: State) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), user_id, app_name, state)
    }

    /// A detached session with a caller-chosen id.
    pub fn with_id(
        id: impl Into<String>,
        user_id: impl Into<String>,
        app_name: impl Into<String>,
        state: State,
    ) -> Self {
        Self {
            id: id.into(),
            app_name: app_name.into(),
            user_id: user_id.into(),
            state,
            events: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Look up a top-level state value.
    pub fn state_value(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        self.events.push(event);
        self.touch();
    }

    /// Shallow merge: top-level keys in `partial` replace existing ones.
    pub(crate) fn merge_state(&mut self, partial: State) {
        self.state.extend(partial);
        self.touch();
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}
