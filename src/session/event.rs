//! Conversation events recorded in a session's log.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One immutable entry in a session's event log.
///
/// Serialized with a `role` tag: `user`, `agent`, `tool_call`, `tool_result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Event {
    #[serde(rename = "user")]
    UserMessage { content: String },
    #[serde(rename = "agent")]
    AgentMessage { content: String },
    ToolCall { name: String, args: Map<String, Value> },
    ToolResult { tool_name: String, result: Value },
}

impl Event {
    pub fn user(content: impl Into<String>) -> Self {
        Self::UserMessage {
            content: content.into(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self::AgentMessage {
            content: content.into(),
        }
    }

    /// A tool call. Non-object arguments are stored under `"value"`.
    pub fn tool_call(name: impl Into<String>, args: Value) -> Self {
        let args = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => Map::from_iter([("value".to_string(), other)]),
        };
        Self::ToolCall {
            name: name.into(),
            args,
        }
    }

    pub fn tool_result(tool_name: impl Into<String>, result: Value) -> Self {
        Self::ToolResult {
            tool_name: tool_name.into(),
            result,
        }
    }

    /// Message text for user and agent events.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::UserMessage { content } | Self::AgentMessage { content } => Some(content),
            Self::ToolCall { .. } | Self::ToolResult { .. } => None,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Self::UserMessage { .. })
    }
}
