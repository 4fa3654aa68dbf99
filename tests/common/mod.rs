//! Shared test helpers: scripted providers and handlers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use agentdeck::agent::{AgentHandler, AgentReply};
use agentdeck::error::{AgentError, Result};
use agentdeck::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use agentdeck::session::{Session, State};
use agentdeck::types::*;

/// A provider that replays queued responses and records every request.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<Vec<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push(ProviderResponse {
            text: text.to_string(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
                total_tokens: 30,
            },
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        });
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: Value) {
        self.responses.lock().unwrap().push(ProviderResponse {
            text: String::new(),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
                total_tokens: 15,
            },
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
        });
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_response(&self, request: &ProviderRequest) -> ProviderResponse {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return ProviderResponse {
                text: "Mock response".to_string(),
                usage: Usage::default(),
                tool_calls: vec![],
                finish_reason: Some(FinishReason::Stop),
            };
        }
        responses.remove(0)
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        Ok(self.next_response(request))
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta>>> {
        let text = self.next_response(request).text;

        let stream = async_stream::stream! {
            for chunk in text.chars().collect::<Vec<_>>().chunks(5) {
                let text: String = chunk.iter().collect();
                yield Ok(TextStreamDelta {
                    text,
                    event_type: StreamEventType::TextDelta,
                    finish_reason: None,
                    usage: None,
                });
            }
            yield Ok(TextStreamDelta {
                text: String::new(),
                event_type: StreamEventType::Done,
                finish_reason: Some(FinishReason::Stop),
                usage: Some(Usage { input_tokens: 10, output_tokens: 20, total_tokens: 30 }),
            });
        };

        Ok(Box::pin(stream))
    }
}

/// A provider that fails the test if it is ever called.
pub struct PanicProvider;

#[async_trait]
impl ModelProvider for PanicProvider {
    fn provider_name(&self) -> &str {
        "panic"
    }

    fn model_id(&self) -> &str {
        "never-called"
    }

    async fn generate_text(&self, _request: &ProviderRequest) -> Result<ProviderResponse> {
        panic!("the model must not be called for this request");
    }

    async fn stream_text(
        &self,
        _request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta>>> {
        panic!("the model must not be called for this request");
    }
}

/// Replies `echo: {message}` and counts calls.
#[derive(Default)]
pub struct EchoAgent {
    pub calls: AtomicUsize,
    pub output_key: Option<String>,
}

impl EchoAgent {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentHandler for EchoAgent {
    fn name(&self) -> &str {
        "echo"
    }

    fn output_key(&self) -> Option<&str> {
        self.output_key.as_deref()
    }

    async fn handle(&self, message: &str, _session: &Session) -> Result<AgentReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AgentReply::text(format!("echo: {message}")))
    }
}

/// Always fails with a handler error.
pub struct FailingAgent;

#[async_trait]
impl AgentHandler for FailingAgent {
    fn name(&self) -> &str {
        "failing"
    }

    async fn handle(&self, _message: &str, _session: &Session) -> Result<AgentReply> {
        Err(AgentError::handler("failing", "boom"))
    }
}

/// Sleeps before replying `reply to {message}`.
pub struct SlowAgent {
    pub delay: Duration,
}

#[async_trait]
impl AgentHandler for SlowAgent {
    fn name(&self) -> &str {
        "slow"
    }

    async fn handle(&self, message: &str, _session: &Session) -> Result<AgentReply> {
        tokio::time::sleep(self.delay).await;
        Ok(AgentReply::text(format!("reply to {message}")))
    }
}

/// Returns a fixed reply.
pub struct FixedAgent {
    pub reply: AgentReply,
    pub output_key: Option<String>,
}

#[async_trait]
impl AgentHandler for FixedAgent {
    fn name(&self) -> &str {
        "fixed"
    }

    fn output_key(&self) -> Option<&str> {
        self.output_key.as_deref()
    }

    async fn handle(&self, _message: &str, _session: &Session) -> Result<AgentReply> {
        Ok(self.reply.clone())
    }
}

/// Build a state map from a JSON object literal.
pub fn state(value: Value) -> State {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
