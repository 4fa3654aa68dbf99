//! Catalog of ready-made agents.

pub mod email;
pub mod greeting;
pub mod qna;
pub mod search;
pub mod time;

use std::sync::Arc;

use bon::Builder;
use strum::{Display, EnumIter, EnumString};

use crate::agent::{AgentDefinition, AgentHandler, LlmAgent};
use crate::config::AgentConfig;
use crate::error::Result;

pub use email::{create_email_agent, create_email_generation_agent, parse_email_reply, Email};
pub use greeting::create_greeting_agent;
pub use qna::QnaAgent;
pub use search::create_search_agent;
pub use time::create_time_agent;

/// Model used by the catalog factories unless overridden.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Overrides accepted by every factory.
#[derive(Debug, Clone, Default, Builder)]
pub struct AgentOptions {
    #[builder(into)]
    pub model: Option<String>,
    #[builder(into)]
    pub agent_name: Option<String>,
    /// Replaces the default instruction. Ignored by agents whose behavior
    /// depends on their tool (search, time).
    #[builder(into)]
    pub instruction_override: Option<String>,
}

impl AgentOptions {
    pub(crate) fn model_or(&self, default: &str) -> String {
        self.model.clone().unwrap_or_else(|| default.to_string())
    }

    pub(crate) fn name_or(&self, default: &str) -> String {
        self.agent_name.clone().unwrap_or_else(|| default.to_string())
    }

    pub(crate) fn instruction_or(&self, default: &str) -> String {
        self.instruction_override
            .clone()
            .unwrap_or_else(|| default.to_string())
    }
}

/// The agents this crate ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum AgentKind {
    Email,
    EmailGeneration,
    Greeting,
    Search,
    Time,
    Qna,
}

impl AgentKind {
    /// App label sessions for this agent are filed under.
    pub fn app_name(self) -> &'static str {
        match self {
            Self::Email => "email_agent_app",
            Self::EmailGeneration => "email_generation_agent_app",
            Self::Greeting => "greeting_agent_app",
            Self::Search => "search_agent_app",
            Self::Time => "time_agent_app",
            Self::Qna => qna::QNA_APP_NAME,
        }
    }

    /// Greeting printed by the interactive CLI.
    pub fn banner(self) -> &'static str {
        match self {
            Self::Email | Self::EmailGeneration => "Email agent ready. Tell me what email to write!",
            Self::Greeting => "Greeting agent ready. Say hello!",
            Self::Search => "Search agent ready. Ask me to search for something!",
            Self::Time => "Time agent ready. Ask me what time it is!",
            Self::Qna => "Q&A agent ready. Ask me anything!",
        }
    }

    /// Whether replies are JSON emails.
    pub fn produces_email(self) -> bool {
        matches!(self, Self::Email | Self::EmailGeneration)
    }

    /// Declarative definition for instruction-driven agents; `None` for Q&A.
    pub fn definition(self, options: &AgentOptions) -> Option<AgentDefinition> {
        match self {
            Self::Email => Some(create_email_agent(options)),
            Self::EmailGeneration => Some(create_email_generation_agent(options)),
            Self::Greeting => Some(create_greeting_agent(options)),
            Self::Search => Some(create_search_agent(options)),
            Self::Time => Some(create_time_agent(options)),
            Self::Qna => None,
        }
    }

    /// Build a runnable handler backed by Gemini.
    pub fn build(self, options: &AgentOptions, config: &AgentConfig) -> Result<Arc<dyn AgentHandler>> {
        match self.definition(options) {
            Some(definition) => Ok(Arc::new(LlmAgent::from_config(definition, config)?)),
            None => Ok(Arc::new(QnaAgent::from_config(options, config)?)),
        }
    }
}
