//! Provider formatting helpers.

use serde_json::Value;

/// Gemini requires `functionResponse.response` to be a JSON object.
/// Objects pass through; anything else is wrapped as `{"result": value}`.
pub(crate) fn tool_result_to_object(value: &Value) -> Value {
    match value {
        Value::Object(_) => value.clone(),
        other => serde_json::json!({ "result": other }),
    }
}

/// Strip a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
