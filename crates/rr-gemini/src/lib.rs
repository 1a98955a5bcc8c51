//! Gemini-backed AI gateway
//!
//! Three operations behind one trait: free-text generation, JSON-constrained
//! generation with fence stripping and schema-validated decoding, and chat
//! streamed over SSE. All failures are folded into response values; the
//! stream is the only surface with an explicit error item.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod config;
pub mod gateway;
pub mod json;
pub mod stream;
pub mod types;

pub use client::{GeminiClient, MISSING_KEY_ERROR};
pub use config::{GeminiConfig, API_KEY_ENV, DEFAULT_MODEL};
pub use gateway::AiGateway;
pub use json::{decode_validated, strip_code_fence, JsonDecodeError};
pub use stream::{collect_text, ChatStream};
pub use types::{
    ChatEvent, ChatOptions, ChatRole, ChatTurn, GroundingChunk, GroundingSource, JsonResponse,
    ReasoningBudget, TextRequest, TextResponse,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
    pub use crate::client::GeminiClient;
    pub use crate::config::GeminiConfig;
    pub use crate::gateway::AiGateway;
    pub use crate::json::decode_validated;
    pub use crate::stream::ChatStream;
    pub use crate::types::{
        ChatEvent, ChatOptions, ChatTurn, GroundingChunk, JsonResponse, ReasoningBudget,
        TextRequest, TextResponse,
    };
}
