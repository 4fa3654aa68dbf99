//! Q&A agent that answers from session state before asking a model.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::AgentOptions;
use crate::agent::{AgentHandler, AgentReply};
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};
use crate::provider::{GoogleProvider, ModelProvider, ProviderRequest};
use crate::session::Session;

pub const QNA_APP_NAME: &str = "qna-demo";
pub const DEFAULT_QNA_MODEL: &str = "gemini-1.5-flash";

const FAVORITE_SHOW_TRIGGER: &str = "favorite tv show";

/// Answers "favorite TV show" questions from `state.preferences` and
/// delegates everything else to a model.
pub struct QnaAgent {
    name: String,
    llm: Option<Arc<dyn ModelProvider>>,
}

impl QnaAgent {
    pub fn new(llm: Arc<dyn ModelProvider>) -> Self {
        Self {
            name: "qna_agent".into(),
            llm: Some(llm),
        }
    }

    /// An agent that can only answer from state. Delegation fails with
    /// [`AgentError::Authentication`].
    pub fn without_llm() -> Self {
        Self {
            name: "qna_agent".into(),
            llm: None,
        }
    }

    /// Gemini-backed agent. A missing API key is tolerated so state lookups
    /// keep working offline.
    pub fn from_config(options: &AgentOptions, config: &AgentConfig) -> Result<Self> {
        let mut agent = match config.api_key() {
            Some(_) => {
                let model = options.model_or(DEFAULT_QNA_MODEL);
                Self::new(Arc::new(GoogleProvider::from_config(model, config)?))
            }
            None => {
                warn!("no API key configured; Q&A agent will only answer from session state");
                Self::without_llm()
            }
        };
        if let Some(name) = &options.agent_name {
            agent.name = name.clone();
        }
        Ok(agent)
    }

    /// Reply built from session state, if the question is one state can answer.
    pub fn answer_from_state(message: &str, session: &Session) -> Option<String> {
        if !message.to_lowercase().contains(FAVORITE_SHOW_TRIGGER) {
            return None;
        }
        let show = session
            .state_value("preferences")
            .and_then(|prefs| prefs.get("favorite_tv_show"))
            .and_then(display_value)?;
        let username = session
            .state_value("username")
            .and_then(display_value)
            .unwrap_or_else(|| "user".to_string());
        Some(format!("I remember! {username}'s favorite TV show is {show}."))
    }
}

/// Text for a state value. Null, `false`, zero and empty strings, arrays
/// and objects count as absent.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl AgentHandler for QnaAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, message: &str, session: &Session) -> Result<AgentReply> {
        if let Some(answer) = Self::answer_from_state(message, session) {
            debug!(session_id = session.id(), "answered from session state");
            return Ok(AgentReply::text(answer));
        }

        let llm = self.llm.as_ref().ok_or_else(|| {
            AgentError::Authentication(
                "Set GOOGLE_API_KEY or GENAI_API_KEY to ask questions the session cannot answer."
                    .into(),
            )
        })?;
        debug!(session_id = session.id(), model = llm.model_id(), "delegating to model");
        let response = llm.generate_text(&ProviderRequest::prompt(message)).await?;
        Ok(AgentReply::text(response.text))
    }
}

impl std::fmt::Debug for QnaAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QnaAgent")
            .field("name", &self.name)
            .field("model", &self.llm.as_ref().map(|p| p.model_id().to_string()))
            .finish()
    }
}
