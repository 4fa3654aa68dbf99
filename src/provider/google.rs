//! Google Gemini API provider.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::types::*;
use crate::util::retry::RetryPolicy;

use super::format::tool_result_to_object;
use super::http::{build_client, parse_sse_data, status_to_error, take_line};
use super::{BuiltinTool, ModelProvider, ProviderRequest, ProviderResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    retry_policy: RetryPolicy,
}

impl std::fmt::Debug for GoogleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoogleProvider {
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: Option<String>,
    ) -> Result<Self, AgentError> {
        Self::with_client(
            model,
            api_key,
            base_url,
            build_client(AgentConfig::new().timeout())?,
        )
    }

    /// Build a provider for `model` from resolved configuration.
    pub fn from_config(model: impl Into<String>, config: &AgentConfig) -> Result<Self, AgentError> {
        let api_key = config.require_api_key()?;
        Self::with_client(
            model,
            api_key,
            config.base_url().map(str::to_string),
            build_client(config.timeout())?,
        )
    }

    fn with_client(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: Option<String>,
        client: reqwest::Client,
    ) -> Result<Self, AgentError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(AgentError::Configuration("Gemini model id is empty".into()));
        }
        Ok(Self {
            model,
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response, AgentError> {
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }
        Ok(resp)
    }

    pub(crate) fn build_request_body(&self, request: &ProviderRequest) -> Value {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for msg in &request.messages {
            match msg.role {
                Role::System => system_parts.push(json!({ "text": msg.text_content() })),
                Role::User => contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": msg.text_content() }],
                })),
                Role::Assistant => {
                    let parts: Vec<Value> = msg
                        .content
                        .iter()
                        .filter_map(|part| match part {
                            ContentPart::Text { text } if !text.is_empty() => {
                                Some(json!({ "text": text }))
                            }
                            ContentPart::ToolCall(tc) => Some(json!({
                                "functionCall": { "name": tc.name, "args": tc.arguments }
                            })),
                            _ => None,
                        })
                        .collect();
                    if !parts.is_empty() {
                        contents.push(json!({ "role": "model", "parts": parts }));
                    }
                }
                Role::Tool => {
                    let parts: Vec<Value> = msg
                        .content
                        .iter()
                        .filter_map(|part| match part {
                            ContentPart::ToolResult(tr) => Some(json!({
                                "functionResponse": {
                                    "name": tr.tool_name,
                                    "response": tool_result_to_object(&tr.result),
                                }
                            })),
                            _ => None,
                        })
                        .collect();
                    if !parts.is_empty() {
                        contents.push(json!({ "role": "function", "parts": parts }));
                    }
                }
            }
        }

        let mut body = Map::new();
        body.insert("contents".into(), Value::Array(contents));

        if !system_parts.is_empty() {
            body.insert("systemInstruction".into(), json!({ "parts": system_parts }));
        }

        let settings = &request.settings;
        let mut gen_config = Map::new();
        if let Some(max) = settings.max_tokens {
            gen_config.insert("maxOutputTokens".into(), max.into());
        }
        if let Some(temp) = settings.temperature {
            gen_config.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = settings.top_p {
            gen_config.insert("topP".into(), top_p.into());
        }
        if let Some(top_k) = settings.top_k {
            gen_config.insert("topK".into(), top_k.into());
        }
        if let Some(ref stops) = settings.stop_sequences {
            gen_config.insert("stopSequences".into(), json!(stops));
        }
        match settings.response_format {
            Some(ResponseFormat::JsonObject) => {
                gen_config.insert("responseMimeType".into(), "application/json".into());
            }
            Some(ResponseFormat::JsonSchema { ref schema, .. }) => {
                gen_config.insert("responseMimeType".into(), "application/json".into());
                gen_config.insert("responseSchema".into(), schema.clone());
            }
            Some(ResponseFormat::Text) | None => {}
        }
        if !gen_config.is_empty() {
            body.insert("generationConfig".into(), Value::Object(gen_config));
        }

        let mut tools = Vec::new();
        if let Some(ref defs) = request.tools {
            if !defs.is_empty() {
                let fn_decls: Vec<Value> = defs
                    .iter()
                    .map(|t| {
                        json!({
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        })
                    })
                    .collect();
                tools.push(json!({ "functionDeclarations": fn_decls }));
            }
        }
        for builtin in &request.builtin_tools {
            match builtin {
                BuiltinTool::GoogleSearch => tools.push(json!({ "googleSearch": {} })),
            }
        }
        if !tools.is_empty() {
            body.insert("tools".into(), Value::Array(tools));
        }

        Value::Object(body)
    }
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate_text(&self, request: &ProviderRequest) -> Result<ProviderResponse, AgentError> {
        let body = self.build_request_body(request);
        let url = self.endpoint("generateContent");

        debug!(model = %self.model, messages = request.messages.len(), "Google generate_text");

        let resp = self.retry_policy.execute(|| self.post(&url, &body)).await?;
        let data: GeminiResponse = resp.json().await?;

        let candidate = data.candidates.into_iter().next().ok_or_else(|| {
            AgentError::InvalidResponse("No candidates in Gemini response".into())
        })?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for part in candidate.content.parts {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(fc) = part.function_call {
                tool_calls.push(AgentToolCall {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: fc.name,
                    arguments: fc.args.unwrap_or_else(|| Value::Object(Map::new())),
                });
            }
        }

        let finish_reason = if tool_calls.is_empty() {
            candidate.finish_reason.as_deref().and_then(FinishReason::from_gemini)
        } else {
            Some(FinishReason::ToolCalls)
        };

        Ok(ProviderResponse {
            text,
            usage: data.usage_metadata.map(Usage::from).unwrap_or_default(),
            tool_calls,
            finish_reason,
        })
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, AgentError>>, AgentError> {
        let body = self.build_request_body(request);
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));

        debug!(model = %self.model, "Google stream_text");

        let resp = self.retry_policy.execute(|| self.post(&url, &body)).await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(AgentError::Network(e));
                        break;
                    }
                };

                buffer.extend_from_slice(&chunk);

                while let Some(line) = take_line(&mut buffer) {
                    let Some(data) = parse_sse_data(&line) else {
                        continue;
                    };
                    let resp = match serde_json::from_str::<GeminiResponse>(data) {
                        Ok(resp) => resp,
                        Err(e) => {
                            yield Err(AgentError::Stream(format!("Malformed Gemini chunk: {e}")));
                            continue;
                        }
                    };
                    let usage = resp.usage_metadata.map(Usage::from);
                    if let Some(candidate) = resp.candidates.into_iter().next() {
                        for part in candidate.content.parts {
                            if let Some(t) = part.text {
                                yield Ok(TextStreamDelta {
                                    text: t,
                                    event_type: StreamEventType::TextDelta,
                                    finish_reason: None,
                                    usage: None,
                                });
                            }
                        }
                        if let Some(reason) = candidate.finish_reason.as_deref() {
                            yield Ok(TextStreamDelta {
                                text: String::new(),
                                event_type: StreamEventType::Done,
                                finish_reason: FinishReason::from_gemini(reason),
                                usage,
                            });
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

// Internal Gemini response types

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl From<GeminiUsage> for Usage {
    fn from(u: GeminiUsage) -> Self {
        Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }
    }
}
