//! Time agent: reports the current date and time via a function tool.

use super::{AgentOptions, DEFAULT_MODEL};
use crate::agent::AgentDefinition;
use crate::tools::builtin::current_time_tool;

const TIME_INSTRUCTION: &str = "You are an agent that displays the current date and time. \
Use the `get_current_time` tool to get the current time, and then display it to the user.";

pub fn create_time_agent(options: &AgentOptions) -> AgentDefinition {
    AgentDefinition::builder()
        .name(options.name_or("time_agent"))
        .model(options.model_or(DEFAULT_MODEL))
        .description("Displays the current date and time.")
        .instruction(TIME_INSTRUCTION)
        .tools(vec![current_time_tool()])
        .build()
}
