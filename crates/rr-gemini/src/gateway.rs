//! The AI gateway seam
//!
//! Workflows depend on this trait rather than on the concrete client, so
//! tests can script responses without a network.

use async_trait::async_trait;

use crate::stream::ChatStream;
use crate::types::{ChatOptions, ChatTurn, JsonResponse, TextRequest, TextResponse};

/// Provider-agnostic AI operations
///
/// All three calls fold failures into their response values; only the chat
/// stream carries an explicit error item.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Generate free text
    async fn generate_text(&self, request: TextRequest) -> TextResponse;

    /// Generate JSON-constrained output
    async fn generate_json(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> JsonResponse;

    /// Stream a chat reply; the gateway appends `new_message` after `history`
    async fn stream_chat(
        &self,
        history: Vec<ChatTurn>,
        new_message: &str,
        options: ChatOptions,
    ) -> ChatStream;
}

#[async_trait]
impl<'a, T: AiGateway + ?Sized> AiGateway for &'a T {
    async fn generate_text(&self, request: TextRequest) -> TextResponse {
        (**self).generate_text(request).await
    }

    async fn generate_json(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> JsonResponse {
        (**self).generate_json(prompt, system_instruction).await
    }

    async fn stream_chat(
        &self,
        history: Vec<ChatTurn>,
        new_message: &str,
        options: ChatOptions,
    ) -> ChatStream {
        (**self).stream_chat(history, new_message, options).await
    }
}

#[async_trait]
impl<T: AiGateway + ?Sized> AiGateway for std::sync::Arc<T> {
    async fn generate_text(&self, request: TextRequest) -> TextResponse {
        (**self).generate_text(request).await
    }

    async fn generate_json(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> JsonResponse {
        (**self).generate_json(prompt, system_instruction).await
    }

    async fn stream_chat(
        &self,
        history: Vec<ChatTurn>,
        new_message: &str,
        options: ChatOptions,
    ) -> ChatStream {
        (**self).stream_chat(history, new_message, options).await
    }
}
