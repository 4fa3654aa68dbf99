//! Convenience re-exports for common use.

pub use crate::agent::{AgentDefinition, AgentHandler, AgentReply, LlmAgent};
pub use crate::agents::{AgentKind, AgentOptions, Email, QnaAgent};
pub use crate::config::AgentConfig;
pub use crate::error::{AgentError, Result};
pub use crate::provider::{GoogleProvider, ModelProvider};
pub use crate::runner::Runner;
pub use crate::session::{Event, InMemorySessionStore, Session, SessionStore, State};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};
pub use crate::types::{FinishReason, GenerationSettings, ModelMessage, Role, Usage};
