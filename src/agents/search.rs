//! Search agent: answers with Gemini's built-in Google Search grounding.

use super::{AgentOptions, DEFAULT_MODEL};
use crate::agent::AgentDefinition;
use crate::provider::BuiltinTool;

const SEARCH_INSTRUCTION: &str = "You are a helpful assistant that uses Google Search to \
answer user questions. When the user asks a question, use the `google_search` tool to find \
an answer and then respond to the user.";

pub fn create_search_agent(options: &AgentOptions) -> AgentDefinition {
    AgentDefinition::builder()
        .name(options.name_or("search_agent"))
        .model(options.model_or(DEFAULT_MODEL))
        .description("Uses Google Search to answer user questions.")
        .instruction(SEARCH_INSTRUCTION)
        .builtin_tools(vec![BuiltinTool::GoogleSearch])
        .build()
}
