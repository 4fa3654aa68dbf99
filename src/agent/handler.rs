//! The capability every agent implements.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::{Event, Session};

/// Receives reply text chunks as they are produced.
pub type DeltaSink = dyn for<'a> Fn(&'a str) + Send + Sync;

/// An agent's answer to one user message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentReply {
    pub text: String,
    /// Tool traffic produced while answering, in the order it happened.
    pub tool_events: Vec<Event>,
}

impl AgentReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_events: Vec::new(),
        }
    }
}

impl From<String> for AgentReply {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<&str> for AgentReply {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

/// Answers a message in the context of a session.
///
/// Handlers read `session.state()` and the event log but never mutate the
/// session; the runner records everything they return.
#[async_trait]
pub trait AgentHandler: Send + Sync {
    fn name(&self) -> &str;

    /// State key under which the runner stores each reply.
    fn output_key(&self) -> Option<&str> {
        None
    }

    async fn handle(&self, message: &str, session: &Session) -> Result<AgentReply>;

    /// Like [`handle`](Self::handle), passing text chunks to `on_delta` as
    /// they are produced. The default emits the whole reply once.
    async fn handle_streaming(
        &self,
        message: &str,
        session: &Session,
        on_delta: &DeltaSink,
    ) -> Result<AgentReply> {
        let reply = self.handle(message, session).await?;
        on_delta(&reply.text);
        Ok(reply)
    }
}
