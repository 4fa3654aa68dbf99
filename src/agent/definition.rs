//! Declarative agent configuration.

use std::sync::Arc;

use bon::Builder;

use crate::provider::BuiltinTool;
use crate::tools::Tool;
use crate::types::{GenerationSettings, ResponseFormat};

/// JSON schema the model's reply must follow.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

/// Everything needed to run an instruction-driven LLM agent.
///
/// ```
/// use agentdeck::agent::AgentDefinition;
///
/// let def = AgentDefinition::builder()
///     .name("greeting_agent")
///     .model("gemini-2.0-flash")
///     .instruction("Greet the user by name.")
///     .build();
/// assert!(def.tools.is_empty());
/// ```
#[derive(Clone, Builder)]
pub struct AgentDefinition {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub model: String,
    #[builder(into, default)]
    pub description: String,
    #[builder(into, default)]
    pub instruction: String,
    /// State key the runner writes each reply to.
    #[builder(into)]
    pub output_key: Option<String>,
    pub output_schema: Option<OutputSchema>,
    #[builder(default)]
    pub tools: Vec<Arc<dyn Tool>>,
    #[builder(default)]
    pub builtin_tools: Vec<BuiltinTool>,
    #[builder(default)]
    pub settings: GenerationSettings,
}

impl AgentDefinition {
    /// Generation settings with the output schema applied.
    pub fn effective_settings(&self) -> GenerationSettings {
        let mut settings = self.settings.clone();
        if let Some(ref out) = self.output_schema {
            settings.response_format = Some(ResponseFormat::JsonSchema {
                schema: out.schema.clone(),
                name: out.name.clone(),
            });
        }
        settings
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl std::fmt::Debug for AgentDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentDefinition")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("description", &self.description)
            .field("output_key", &self.output_key)
            .field("output_schema", &self.output_schema.as_ref().map(|s| &s.name))
            .field("tools", &self.tool_names())
            .field("builtin_tools", &self.builtin_tools)
            .finish()
    }
}
