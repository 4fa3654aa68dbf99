//! Built-in function tools used by the agent catalog.

use std::sync::Arc;

use crate::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use crate::tools::types::AgentToolParameters;

pub const CURRENT_TIME_TOOL: &str = "get_current_time";

/// Create the `get_current_time` tool: local date and time as ISO-8601.
pub fn current_time_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        CURRENT_TIME_TOOL,
        "Gets the current date and time.",
        AgentToolParameters::empty(),
        |_args, _ctx: ToolExecutionContext| async move {
            Ok(serde_json::Value::String(current_time_iso()))
        },
    ))
}

fn current_time_iso() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
