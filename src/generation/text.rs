//! Text generation with tool loop.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AgentError;
use crate::provider::{BuiltinTool, ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::arguments::ToolArguments;
use crate::tools::tool::{Tool, ToolExecutionContext};
use crate::types::*;

/// Maximum tool loop iterations to prevent infinite loops.
pub const MAX_TOOL_ITERATIONS: usize = 10;

/// Generate text with an optional tool loop.
///
/// If the model returns tool calls, they are executed and fed back until the
/// model produces a final text response or the iteration limit is reached.
/// Tool failures are reported back to the model as error results, not
/// returned to the caller.
pub async fn generate_text(
    provider: &dyn ModelProvider,
    mut messages: Vec<ModelMessage>,
    settings: GenerationSettings,
    tools: &[Arc<dyn Tool>],
    builtin_tools: &[BuiltinTool],
    ctx: &ToolExecutionContext,
) -> Result<GenerateTextResult, AgentError> {
    let tool_defs: Option<Vec<ToolDefinition>> = if tools.is_empty() {
        None
    } else {
        Some(
            tools
                .iter()
                .map(|t| ToolDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters().schema.clone(),
                })
                .collect(),
        )
    };

    let mut steps = Vec::new();
    let mut total_usage = Usage::default();

    for iteration in 0..MAX_TOOL_ITERATIONS {
        let request = ProviderRequest {
            messages: messages.clone(),
            settings: settings.clone(),
            tools: tool_defs.clone(),
            builtin_tools: builtin_tools.to_vec(),
        };

        debug!(iteration, "generate_text: calling provider");
        let response = provider.generate_text(&request).await?;
        total_usage.merge(&response.usage);

        let mut step = GenerationStep {
            text: response.text.clone(),
            tool_calls: response.tool_calls.clone(),
            tool_results: Vec::new(),
            usage: response.usage.clone(),
            finish_reason: response.finish_reason,
        };

        if response.tool_calls.is_empty() {
            steps.push(step);
            return Ok(GenerateTextResult {
                text: response.text,
                steps,
                messages,
                usage: total_usage,
                finish_reason: response.finish_reason,
            });
        }

        let mut assistant_content: Vec<ContentPart> = Vec::new();
        if !response.text.is_empty() {
            assistant_content.push(ContentPart::Text {
                text: response.text.clone(),
            });
        }
        for tc in &response.tool_calls {
            assistant_content.push(ContentPart::ToolCall(tc.clone()));
        }
        messages.push(ModelMessage {
            role: Role::Assistant,
            content: assistant_content,
            timestamp: Some(chrono::Utc::now()),
        });

        for tc in &response.tool_calls {
            let result = execute_tool_call(tools, tc, ctx).await;
            step.tool_results.push(result.clone());
            messages.push(ModelMessage::tool_result(result));
        }

        steps.push(step);
    }

    warn!(limit = MAX_TOOL_ITERATIONS, "generate_text: tool loop limit reached");
    let last_text = steps.last().map(|s| s.text.clone()).unwrap_or_default();
    Ok(GenerateTextResult {
        text: last_text,
        steps,
        messages,
        usage: total_usage,
        finish_reason: Some(FinishReason::Length),
    })
}

async fn execute_tool_call(
    tools: &[Arc<dyn Tool>],
    tc: &AgentToolCall,
    ctx: &ToolExecutionContext,
) -> AgentToolResult {
    let outcome = match tools.iter().find(|t| t.name() == tc.name) {
        Some(tool) => tool.execute(&ToolArguments::new(tc.arguments.clone()), ctx).await,
        None => Err(AgentError::ToolExecution {
            tool_name: tc.name.clone(),
            message: format!("Tool '{}' not found", tc.name),
        }),
    };

    let (result, is_error) = match outcome {
        Ok(value) => (value, false),
        Err(e) => {
            warn!(tool = %tc.name, error = %e, "Tool execution failed");
            (serde_json::json!({ "error": e.to_string() }), true)
        }
    };

    AgentToolResult {
        tool_call_id: tc.id.clone(),
        tool_name: tc.name.clone(),
        result,
        is_error,
    }
}
