//! JSON post-processing for AI output
//!
//! Models wrap JSON in markdown fences often enough that stripping one outer
//! fence is part of the parsing contract. Typed decoding additionally
//! validates the value against the target type's derived JSON Schema before
//! deserializing, so shape errors surface as schema violations rather than
//! serde messages deep in a workflow.

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::types::JsonResponse;

/// One outer triple-backtick fence with an optional language tag
static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").expect("fence regex is valid")
});

/// Strip a single outer code fence, if present
///
/// The input is trimmed first; text without a complete outer fence is
/// returned unchanged (inner fences are untouched).
#[must_use]
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(caps) = FENCE_RE.captures(trimmed) {
        if let Some(inner) = caps.get(2) {
            return inner.as_str().trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Typed decoding failures
#[derive(Debug, Error)]
pub enum JsonDecodeError {
    /// The gateway call itself failed
    #[error("AI call failed: {0}")]
    Call(String),

    /// The response carried no parsed data
    #[error("AI response contained no JSON data")]
    NoData,

    /// The parsed value does not match the expected schema
    #[error("AI response does not match expected schema: {0}")]
    Schema(String),

    /// Deserialization failed after schema validation
    #[error("failed to deserialize AI response: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Decode a [`JsonResponse`] into `T`, validating against `T`'s schema first
pub fn decode_validated<T>(response: JsonResponse) -> Result<T, JsonDecodeError>
where
    T: JsonSchema + DeserializeOwned,
{
    if let Some(error) = response.error {
        return Err(JsonDecodeError::Call(error));
    }
    let data = response.data.ok_or(JsonDecodeError::NoData)?;

    let schema = schemars::schema_for!(T);
    let schema_value = serde_json::to_value(&schema)?;
    let compiled = jsonschema::JSONSchema::compile(&schema_value)
        .map_err(|e| JsonDecodeError::Schema(e.to_string()))?;
    if let Err(errors) = compiled.validate(&data) {
        let detail = errors
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(JsonDecodeError::Schema(detail));
    }

    Ok(serde_json::from_value(data)?)
}
