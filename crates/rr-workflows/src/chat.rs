//! Chat session over the streaming gateway
//!
//! Keeps an ordered transcript. Each send appends the user turn and an AI
//! placeholder, then folds stream deltas into that placeholder by its message
//! id, so a stale stream can never touch a later message. A stream error
//! turns the same placeholder into a system-tagged error message.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ulid::Ulid;

use rr_gemini::{AiGateway, ChatEvent, ChatOptions, ChatTurn, GroundingChunk, ReasoningBudget};

/// Unique chat message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Ulid);

impl MessageId {
    /// Generate a new message id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    /// The human participant
    User,
    /// The model
    Ai,
    /// Error/status messages
    System,
}

/// One message in a chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message id
    pub id: MessageId,
    /// Author
    pub sender: Sender,
    /// Message text
    pub text: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Grounding sources accumulated over the stream
    pub grounding_chunks: Vec<GroundingChunk>,
    /// Still receiving deltas
    pub is_loading: bool,
    /// Marks a failed AI reply
    pub is_error: bool,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
            grounding_chunks: Vec::new(),
            is_loading: false,
            is_error: false,
        }
    }
}

/// A chat session bound to a gateway
pub struct ChatSession<G> {
    gateway: G,
    system_instruction: Option<String>,
    reasoning_budget: ReasoningBudget,
    messages: Vec<ChatMessage>,
}

impl<G: AiGateway> ChatSession<G> {
    /// Create a session
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            system_instruction: None,
            reasoning_budget: ReasoningBudget::Default,
            messages: Vec::new(),
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

    /// The transcript so far
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Look up a message by id
    #[must_use]
    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn apply_to(&mut self, id: MessageId, f: impl FnOnce(&mut ChatMessage)) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            f(message);
        }
    }

    /// Wire history: user and AI turns only, system messages excluded
    fn history_for_gateway(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .filter_map(|m| match m.sender {
                Sender::User => Some(ChatTurn::user(m.text.clone())),
                Sender::Ai => Some(ChatTurn::model(m.text.clone())),
                Sender::System => None,
            })
            .collect()
    }

    /// Send a user message and stream the AI reply to completion
    ///
    /// Returns the id of the AI message (or of the system error message that
    /// replaced it).
    pub async fn send(&mut self, text: impl Into<String>) -> MessageId {
        let text = text.into();
        let history = self.history_for_gateway();

        self.messages.push(ChatMessage::new(Sender::User, text.clone()));

        let mut placeholder = ChatMessage::new(Sender::Ai, "");
        placeholder.is_loading = true;
        let ai_id = placeholder.id;
        self.messages.push(placeholder);

        let options = ChatOptions {
            system_instruction: self.system_instruction.clone(),
            reasoning_budget: self.reasoning_budget,
        };
        let mut stream = self.gateway.stream_chat(history, &text, options).await;

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatEvent::Delta {
                    text: delta,
                    grounding_chunks,
                }) => {
                    self.apply_to(ai_id, |message| {
                        message.text.push_str(&delta);
                        message.grounding_chunks.extend(grounding_chunks);
                    });
                }
                Ok(ChatEvent::Done) => {
                    debug!(message = %ai_id, "chat reply complete");
                    self.apply_to(ai_id, |message| message.is_loading = false);
                    break;
                }
                Err(err) => {
                    self.apply_to(ai_id, |message| {
                        message.sender = Sender::System;
                        message.text = format!("Error: {err}");
                        message.is_loading = false;
                        message.is_error = true;
                    });
                    break;
                }
            }
        }

        ai_id
    }
}
