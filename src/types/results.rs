//! Result types returned by the generation loop.

use super::generation::FinishReason;
use super::message::{AgentToolCall, AgentToolResult, ModelMessage};
use super::usage::Usage;

/// One model round-trip inside the tool loop.
#[derive(Debug, Clone)]
pub struct GenerationStep {
    pub text: String,
    pub tool_calls: Vec<AgentToolCall>,
    pub tool_results: Vec<AgentToolResult>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Final result of a (possibly multi-step) generation.
#[derive(Debug, Clone)]
pub struct GenerateTextResult {
    pub text: String,
    pub steps: Vec<GenerationStep>,
    /// Full message list including tool traffic.
    pub messages: Vec<ModelMessage>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}
