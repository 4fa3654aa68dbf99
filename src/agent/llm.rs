//! Instruction-driven agent backed by a model provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::Result;
use crate::generation::{collect_stream_with, generate_text};
use crate::provider::{GoogleProvider, ModelProvider, ProviderRequest};
use crate::session::{Event, Session};
use crate::tools::ToolExecutionContext;
use crate::types::{GenerateTextResult, ModelMessage};

use super::definition::AgentDefinition;
use super::handler::{AgentHandler, AgentReply, DeltaSink};

/// An agent that renders the session history into a model conversation,
/// prefixed by its instruction, and runs the tool loop.
pub struct LlmAgent {
    definition: AgentDefinition,
    provider: Arc<dyn ModelProvider>,
}

impl LlmAgent {
    pub fn new(definition: AgentDefinition, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            definition,
            provider,
        }
    }

    /// Build with a Gemini provider for the definition's model.
    pub fn from_config(definition: AgentDefinition, config: &AgentConfig) -> Result<Self> {
        let provider = GoogleProvider::from_config(definition.model.clone(), config)?;
        Ok(Self::new(definition, Arc::new(provider)))
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    /// System instruction followed by the session's user/agent messages.
    ///
    /// `message` is appended when the log does not already end with it.
    pub fn build_messages(&self, message: &str, session: &Session) -> Vec<ModelMessage> {
        let mut messages = Vec::with_capacity(session.events().len() + 2);
        if !self.definition.instruction.trim().is_empty() {
            messages.push(ModelMessage::system(self.definition.instruction.clone()));
        }
        for event in session.events() {
            match event {
                Event::UserMessage { content } => messages.push(ModelMessage::user(content.clone())),
                Event::AgentMessage { content } => {
                    messages.push(ModelMessage::assistant(content.clone()))
                }
                Event::ToolCall { .. } | Event::ToolResult { .. } => {}
            }
        }
        let already_last = matches!(
            session.last_event(),
            Some(Event::UserMessage { content }) if content == message
        );
        if !already_last {
            messages.push(ModelMessage::user(message));
        }
        messages
    }

    fn tool_context(session: &Session) -> ToolExecutionContext {
        ToolExecutionContext {
            session_id: Some(session.id().to_string()),
            user_id: Some(session.user_id().to_string()),
        }
    }
}

fn tool_events(result: &GenerateTextResult) -> Vec<Event> {
    let mut events = Vec::new();
    for step in &result.steps {
        for call in &step.tool_calls {
            events.push(Event::tool_call(call.name.clone(), call.arguments.clone()));
        }
        for res in &step.tool_results {
            events.push(Event::tool_result(res.tool_name.clone(), res.result.clone()));
        }
    }
    events
}

#[async_trait]
impl AgentHandler for LlmAgent {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn output_key(&self) -> Option<&str> {
        self.definition.output_key.as_deref()
    }

    async fn handle(&self, message: &str, session: &Session) -> Result<AgentReply> {
        let messages = self.build_messages(message, session);
        debug!(agent = %self.definition.name, messages = messages.len(), "LlmAgent handle");

        let result = generate_text(
            self.provider.as_ref(),
            messages,
            self.definition.effective_settings(),
            &self.definition.tools,
            &self.definition.builtin_tools,
            &Self::tool_context(session),
        )
        .await?;

        Ok(AgentReply {
            tool_events: tool_events(&result),
            text: result.text,
        })
    }

    async fn handle_streaming(
        &self,
        message: &str,
        session: &Session,
        on_delta: &DeltaSink,
    ) -> Result<AgentReply> {
        // Function tools need the request/response loop.
        if !self.definition.tools.is_empty() {
            let reply = self.handle(message, session).await?;
            on_delta(&reply.text);
            return Ok(reply);
        }

        let request = ProviderRequest {
            messages: self.build_messages(message, session),
            settings: self.definition.effective_settings(),
            tools: None,
            builtin_tools: self.definition.builtin_tools.clone(),
        };
        debug!(agent = %self.definition.name, "LlmAgent handle_streaming");

        let stream = self.provider.stream_text(&request).await?;
        let result = collect_stream_with(stream, on_delta).await?;
        Ok(AgentReply::text(result.text))
    }
}

impl std::fmt::Debug for LlmAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAgent")
            .field("definition", &self.definition)
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_id())
            .finish()
    }
}
