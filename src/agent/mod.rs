//! Agents: the handler capability and the LLM-backed implementation.

pub mod definition;
pub mod handler;
pub mod llm;

pub use definition::{AgentDefinition, OutputSchema};
pub use handler::{AgentHandler, AgentReply, DeltaSink};
pub use llm::LlmAgent;
