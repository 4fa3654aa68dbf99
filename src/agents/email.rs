//! Email writing agents and their JSON reply format.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AgentOptions, DEFAULT_MODEL};
use crate::agent::{AgentDefinition, OutputSchema};
use crate::error::{AgentError, Result};
use crate::provider::format::strip_code_fence;

pub const EMAIL_OUTPUT_KEY: &str = "email";

const EMAIL_INSTRUCTION: &str = "You are an Email Generation Assistant.
Your task is to generate a professional email based on the user's request.

GUIDELINES:
- Create an appropriate subject line (concise and relevant)
- Write a well-structured email body with:
    * Professional greeting
    * Clear and concise main content
    * Appropriate closing
    * Your name as signature
- Suggest relevant attachments if applicable (empty list if none needed)
- Email tone should match the purpose (formal for business, friendly for colleagues)
- Keep emails concise but complete

IMPORTANT: Your response MUST be valid JSON matching this structure:
{
    \"subject\": \"Subject line here\",
    \"body\": \"Email body here with proper paragraphs and formatting\"
}

DO NOT include any explanations or additional text outside the JSON response.";

const EMAIL_GENERATION_INSTRUCTION: &str = "You are an Email Generation Assistant. \
Follow every user request to craft a complete, professional email. Reply in valid JSON \
using this structure: {\"subject\": \"Subject line here\", \"body\": \"Email body here with \
proper paragraphs and formatting\"}. Observe these requirements for the email body: start \
with a professional greeting that fits the context, deliver clear and concise paragraphs \
for the main message, close with an appropriate sign-off, and sign as 'Email Generation \
Assistant'. Keep the tone aligned with the user's purpose (formal for business, friendly \
for colleagues) and keep the message concise yet complete. Include a final paragraph that \
begins with 'Suggested attachments:' followed by a JSON-style list (e.g., [] when no \
attachments are needed). Do not include any extra commentary or text outside the JSON object.";

/// A generated email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub subject: String,
    pub body: String,
}

/// Response schema enforcing the [`Email`] shape.
pub fn email_output_schema() -> OutputSchema {
    OutputSchema {
        name: "EmailOutput".into(),
        schema: json!({
            "type": "object",
            "properties": {
                "subject": {
                    "type": "string",
                    "description": "Concise subject line summarizing the email's purpose."
                },
                "body": {
                    "type": "string",
                    "description": "Formatted email body containing greeting, message, closing, and signature."
                }
            },
            "required": ["subject", "body"]
        }),
    }
}

/// Email writer prompted to answer in JSON; the reply lands in state `email`.
pub fn create_email_agent(options: &AgentOptions) -> AgentDefinition {
    AgentDefinition::builder()
        .name(options.name_or("email_agent"))
        .model(options.model_or(DEFAULT_MODEL))
        .description("Generates a professional email based on the user's request.")
        .instruction(options.instruction_or(EMAIL_INSTRUCTION))
        .output_key(EMAIL_OUTPUT_KEY)
        .build()
}

/// Email writer with a response schema enforced by the model API.
pub fn create_email_generation_agent(options: &AgentOptions) -> AgentDefinition {
    AgentDefinition::builder()
        .name(options.name_or("email_generation_agent"))
        .model(options.model_or(DEFAULT_MODEL))
        .description("Generates professional, well-structured emails and returns them as JSON.")
        .instruction(options.instruction_or(EMAIL_GENERATION_INSTRUCTION))
        .output_key(EMAIL_OUTPUT_KEY)
        .output_schema(email_output_schema())
        .build()
}

/// Parse a model reply into an [`Email`], tolerating a ```` ```json ```` fence.
pub fn parse_email_reply(text: &str) -> Result<Email> {
    let json_text = strip_code_fence(text);
    if json_text.is_empty() {
        return Err(AgentError::InvalidResponse("empty email reply".into()));
    }
    Ok(serde_json::from_str(json_text)?)
}
