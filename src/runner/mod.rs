//! Drives one conversational turn: record the user message, ask the agent,
//! record the reply.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::{debug, info};

use crate::agent::{AgentHandler, AgentReply, DeltaSink};
use crate::agents::qna::QNA_APP_NAME;
use crate::error::{AgentError, Result};
use crate::provider::format::strip_code_fence;
use crate::session::{Event, Session, SessionStore, State};

type TurnLock = Arc<tokio::sync::Mutex<()>>;

/// Runs turns for a single agent against a session store.
///
/// Turns on the same session are serialized; turns on different sessions
/// run concurrently.
pub struct Runner {
    app_name: String,
    store: Arc<dyn SessionStore>,
    agent: Arc<dyn AgentHandler>,
    turn_locks: Mutex<HashMap<String, TurnLock>>,
}

impl Runner {
    pub fn new(store: Arc<dyn SessionStore>, agent: Arc<dyn AgentHandler>) -> Self {
        Self {
            app_name: QNA_APP_NAME.to_string(),
            store,
            agent,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// App label used when `run` has to create a session.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn agent(&self) -> &Arc<dyn AgentHandler> {
        &self.agent
    }

    /// Process one user message.
    ///
    /// With `session_id` the session must already exist, otherwise
    /// [`AgentError::SessionNotFound`] is returned and nothing is recorded.
    /// Without it a fresh session is created for `user_id`. Returns the reply
    /// and the session snapshot ending with the agent's message.
    pub async fn run(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        user_text: &str,
    ) -> Result<(String, Session)> {
        self.turn(user_id, session_id, user_text, None).await
    }

    /// Like [`run`](Self::run), passing reply text to `on_delta` as it arrives.
    pub async fn run_streaming(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        user_text: &str,
        on_delta: &DeltaSink,
    ) -> Result<(String, Session)> {
        self.turn(user_id, session_id, user_text, Some(on_delta)).await
    }

    /// Delete a session once any in-flight turn on it has finished, and
    /// forget its turn lock. Returns whether it existed.
    pub async fn end_session(&self, session_id: &str) -> bool {
        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;
        let removed = self.store.delete_session(session_id);
        self.locks().remove(session_id);
        removed
    }

    async fn turn(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        user_text: &str,
        on_delta: Option<&DeltaSink>,
    ) -> Result<(String, Session)> {
        let session_id = match session_id {
            Some(id) => {
                if self.store.get_session(id).is_none() {
                    return Err(AgentError::SessionNotFound(id.to_string()));
                }
                id.to_string()
            }
            None => self
                .store
                .create_session(user_id, &self.app_name, None)
                .id()
                .to_string(),
        };

        let lock = self.turn_lock(&session_id);
        let _turn = lock.lock().await;
        // The session may have been ended while this turn waited.
        if self.store.get_session(&session_id).is_none() {
            return Err(AgentError::SessionNotFound(session_id));
        }

        self.store.append_event(&session_id, Event::user(user_text));
        let snapshot = self.snapshot(&session_id)?;
        debug!(
            session_id = %session_id,
            agent = self.agent.name(),
            events = snapshot.events().len(),
            "runner turn"
        );

        let AgentReply { text, tool_events } = match on_delta {
            Some(on_delta) => {
                self.agent
                    .handle_streaming(user_text, &snapshot, on_delta)
                    .await?
            }
            None => self.agent.handle(user_text, &snapshot).await?,
        };

        for event in tool_events {
            self.store.append_event(&session_id, event);
        }
        self.store.append_event(&session_id, Event::agent(text.clone()));

        if let Some(key) = self.agent.output_key() {
            let mut partial = State::new();
            partial.insert(key.to_string(), output_value(&text));
            self.store.patch_state(&session_id, partial);
            info!(session_id = %session_id, key, "stored agent output");
        }

        let snapshot = self.snapshot(&session_id)?;
        Ok((text, snapshot))
    }

    fn snapshot(&self, session_id: &str) -> Result<Session> {
        self.store
            .get_session(session_id)
            .ok_or_else(|| AgentError::SessionNotFound(session_id.to_string()))
    }

    fn turn_lock(&self, session_id: &str) -> TurnLock {
        self.locks()
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    fn locks(&self) -> std::sync::MutexGuard<'_, HashMap<String, TurnLock>> {
        self.turn_locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("app_name", &self.app_name)
            .field("agent", &self.agent.name())
            .finish()
    }
}

/// JSON objects and arrays are stored structured; anything else as text.
fn output_value(reply: &str) -> Value {
    match serde_json::from_str::<Value>(strip_code_fence(reply)) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::String(reply.to_string()),
    }
}
