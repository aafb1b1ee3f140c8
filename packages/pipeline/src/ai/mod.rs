//! Prompt framing and response parsing shared by generator backends.

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAIGenerator;

use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::traits::generator::GeneratedFields;

/// System message for JSON-mode generation.
pub const JSON_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that returns responses in JSON format.";

/// Append the JSON output instruction naming `fields` to a user prompt.
pub fn with_json_instruction(prompt: &str, fields: &[String]) -> String {
    format!(
        "{}\n\nPlease return your response as a JSON object with the following keys: {}. \
         Return a value or a list of values for each as appropriate.",
        prompt,
        fields.join(", ")
    )
}

/// Parse a model reply into generated fields.
///
/// Tolerates a surrounding markdown code fence. Anything other than a JSON
/// object is a generation error.
pub fn parse_generation_response(raw: &str) -> Result<GeneratedFields> {
    let body = strip_code_fence(raw.trim());
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(PipelineError::Generation(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(PipelineError::Generation(format!(
            "response is not valid JSON: {}",
            e
        ))),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
