//! Greeting agent: asks for the user's name, then greets them.

use super::{AgentOptions, DEFAULT_MODEL};
use crate::agent::AgentDefinition;

const GREETING_INSTRUCTION: &str = "You are a friendly assistant. If you do not yet know the \
user's name, ask for it politely. Once you learn the name, greet the user by name and end \
the conversation after the greeting.";

pub fn create_greeting_agent(options: &AgentOptions) -> AgentDefinition {
    AgentDefinition::builder()
        .name(options.name_or("greeting_agent"))
        .model(options.model_or(DEFAULT_MODEL))
        .description("Collects the user's name and replies with a personalized greeting.")
        .instruction(options.instruction_or(GREETING_INSTRUCTION))
        .build()
}
