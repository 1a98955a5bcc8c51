//! Gateway request and response types
//!
//! Public surface types plus the camelCase wire types for the Gemini REST
//! API. Gateway responses carry failures as data rather than as `Err`: callers
//! inspect the `error` field.

use serde::{Deserialize, Serialize};

/// How much reasoning effort to request from the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReasoningBudget {
    /// Provider default (thinking enabled)
    #[default]
    Default,
    /// Disable thinking for latency-sensitive calls
    Minimal,
}

/// A source the model grounded its answer on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    /// Source URI
    #[serde(default)]
    pub uri: Option<String>,
    /// Source title
    #[serde(default)]
    pub title: Option<String>,
}

/// Grounding attribution attached to generated content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    /// Web search result
    #[serde(default)]
    pub web: Option<GroundingSource>,
    /// Retrieved context document
    #[serde(default)]
    pub retrieved_context: Option<GroundingSource>,
}

/// Request for free-text generation
#[derive(Debug, Clone, Default)]
pub struct TextRequest {
    /// User prompt
    pub prompt: String,
    /// Optional system instruction
    pub system_instruction: Option<String>,
    /// Reasoning budget
    pub reasoning_budget: ReasoningBudget,
    /// Enable web search grounding; never combined with JSON output
    pub web_grounding: bool,
}

impl TextRequest {
    /// Create a request for a prompt
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// With a system instruction
    #[inline]
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// With a reasoning budget
    #[inline]
    #[must_use]
    pub fn with_reasoning_budget(mut self, budget: ReasoningBudget) -> Self {
        self.reasoning_budget = budget;
        self
    }

    /// Enable web search grounding
    #[inline]
    #[must_use]
    pub fn with_web_grounding(mut self) -> Self {
        self.web_grounding = true;
        self
    }

    /// Prefix the prompt with retrieved knowledge-base content
    #[must_use]
    pub fn with_rag_context(mut self, knowledge: &str) -> Self {
        self.prompt = format!(
            "Context from knowledge base:\n---\n{knowledge}\n---\nUser query: {}",
            self.prompt
        );
        self
    }
}

/// Free-text generation result
///
/// `text` is always populated; on failure it carries a human-readable error
/// string and `error` carries the underlying message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextResponse {
    /// Generated text, or an error description
    pub text: String,
    /// Underlying error message, if the call failed
    pub error: Option<String>,
    /// Grounding attributions, when web grounding was enabled
    pub grounding_chunks: Vec<GroundingChunk>,
}

impl TextResponse {
    /// Whether the call succeeded
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// JSON-constrained generation result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonResponse {
    /// Parsed JSON value, `None` on any failure
    pub data: Option<serde_json::Value>,
    /// Error message, if the call or the parse failed
    pub error: Option<String>,
    /// Unmodified provider text, preserved for diagnostics
    pub raw_text: Option<String>,
}

/// One turn of chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "model"
    pub role: ChatRole,
    /// Turn text
    pub text: String,
}

/// Chat participant role on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Human participant
    User,
    /// The model
    Model,
}

impl ChatTurn {
    /// A user turn
    #[inline]
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// A model turn
    #[inline]
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Options for a streamed chat call
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Optional system instruction
    pub system_instruction: Option<String>,
    /// Reasoning budget
    pub reasoning_budget: ReasoningBudget,
}

/// An event on the chat stream
///
/// A well-formed stream is zero or more `Delta`s followed by exactly one
/// `Done`; a failed stream ends with a single `Err` item instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// A chunk of generated text
    Delta {
        /// Text fragment
        text: String,
        /// Grounding attributions for this chunk
        grounding_chunks: Vec<GroundingChunk>,
    },
    /// Normal end of the response
    Done,
}

// ---- wire types ----

/// Streaming/response chunk from the Gemini API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireChunk {
    pub(crate) candidates: Option<Vec<WireCandidate>>,
    #[serde(default)]
    pub(crate) prompt_feedback: Option<WirePromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireCandidate {
    pub(crate) content: Option<WireContent>,
    pub(crate) finish_reason: Option<String>,
    #[serde(default)]
    pub(crate) grounding_metadata: Option<WireGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireContent {
    pub(crate) parts: Vec<WirePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePart {
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireGroundingMetadata {
    #[serde(default)]
    pub(crate) grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePromptFeedback {
    pub(crate) block_reason: Option<String>,
}

/// Gemini error payload
#[derive(Debug, Deserialize)]
pub(crate) struct WireErrorBody {
    pub(crate) error: WireError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireError {
    pub(crate) code: Option<u16>,
    pub(crate) message: String,
}

impl WireChunk {
    /// Concatenated text across all candidate parts
    pub(crate) fn text(&self) -> String {
        let mut out = String::new();
        if let Some(candidates) = &self.candidates {
            for candidate in candidates {
                if let Some(content) = &candidate.content {
                    for part in &content.parts {
                        if let Some(text) = &part.text {
                            out.push_str(text);
                        }
                    }
                }
            }
        }
        out
    }

    /// Grounding chunks from the first candidate
    pub(crate) fn grounding_chunks(&self) -> Vec<GroundingChunk> {
        self.candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_response_chunk() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"},"finishReason":"STOP"}]}"#;
        let chunk: WireChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.text(), "Hello");
        let finish = chunk.candidates.unwrap()[0].finish_reason.clone();
        assert_eq!(finish.as_deref(), Some("STOP"));
    }

    #[test]
    fn parses_grounding_metadata() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"x"}]},"groundingMetadata":{"groundingChunks":[{"web":{"uri":"https://example.org","title":"Example"}}]}}]}"#;
        let chunk: WireChunk = serde_json::from_str(json).unwrap();
        let grounding = chunk.grounding_chunks();
        assert_eq!(grounding.len(), 1);
        assert_eq!(
            grounding[0].web.as_ref().unwrap().uri.as_deref(),
            Some("https://example.org")
        );
    }

    #[test]
    fn parses_error_body() {
        let json = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let body: WireErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.code, Some(429));
        assert_eq!(body.error.message, "Quota exceeded");
    }

    #[test]
    fn rag_context_prefixes_prompt() {
        let request = TextRequest::new("What is known?").with_rag_context("KB content");
        assert!(request.prompt.starts_with("Context from knowledge base:"));
        assert!(request.prompt.contains("KB content"));
        assert!(request.prompt.ends_with("User query: What is known?"));
    }

    #[test]
    fn chat_roles_serialize_lowercase() {
        let turn = ChatTurn::model("hi");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["role"], "model");
    }
}
