//! Test support: scripted mock gateway and common fixtures
//!
//! The mock gateway replays scripted responses in FIFO order and records
//! every prompt it receives, so workflow tests can assert on both sides of
//! the AI seam without a network.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use rr_core::types::{User, UserRole};
use rr_gemini::{
    AiGateway, ChatEvent, ChatOptions, ChatStream, ChatTurn, JsonResponse, TextRequest,
    TextResponse,
};

/// Initialize tracing for tests (safe to call repeatedly)
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Fixture HCP persona
#[must_use]
pub fn test_hcp() -> User {
    User::new("user_hcp_1", "Dr. Alice Smith", UserRole::HealthcareProfessional)
}

/// Fixture researcher persona
#[must_use]
pub fn test_researcher() -> User {
    User::new("user_researcher_1", "Prof. Bob Johnson", UserRole::ExperiencedResearcher)
}

/// Fixture statistician persona
#[must_use]
pub fn test_statistician() -> User {
    User::new("user_statistician_1", "Dr. Carol White", UserRole::Statistician)
}

/// A recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// `generate_text` with the prompt and system instruction
    Text {
        prompt: String,
        system_instruction: Option<String>,
        web_grounding: bool,
    },
    /// `generate_json` with the prompt and system instruction
    Json {
        prompt: String,
        system_instruction: Option<String>,
    },
    /// `stream_chat` with the history length and new message
    Chat {
        history_len: usize,
        new_message: String,
    },
}

#[derive(Default)]
struct Scripts {
    text: VecDeque<TextResponse>,
    json: VecDeque<JsonResponse>,
    chat: VecDeque<Vec<Result<ChatEvent, String>>>,
}

/// Scripted in-memory [`AiGateway`]
///
/// Responses are consumed in the order they were enqueued; an exhausted
/// script yields an error response rather than panicking, so a test failure
/// reads as an assertion miss instead of a poisoned mutex.
#[derive(Default)]
pub struct MockGateway {
    scripts: Mutex<Scripts>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    /// Create an empty mock
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a successful text response
    pub fn push_text(&self, text: impl Into<String>) {
        self.scripts.lock().unwrap().text.push_back(TextResponse {
            text: text.into(),
            error: None,
            grounding_chunks: Vec::new(),
        });
    }

    /// Enqueue a full text response
    pub fn push_text_response(&self, response: TextResponse) {
        self.scripts.lock().unwrap().text.push_back(response);
    }

    /// Enqueue a failing text response
    pub fn push_text_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.scripts.lock().unwrap().text.push_back(TextResponse {
            text: format!("Error generating text: {message}"),
            error: Some(message),
            grounding_chunks: Vec::new(),
        });
    }

    /// Enqueue a successful JSON response
    pub fn push_json(&self, value: serde_json::Value) {
        self.scripts.lock().unwrap().json.push_back(JsonResponse {
            raw_text: Some(value.to_string()),
            data: Some(value),
            error: None,
        });
    }

    /// Enqueue a failing JSON response
    pub fn push_json_error(&self, message: impl Into<String>) {
        self.scripts.lock().unwrap().json.push_back(JsonResponse {
            data: None,
            error: Some(message.into()),
            raw_text: None,
        });
    }

    /// Enqueue a chat script (events replayed in order)
    pub fn push_chat_script(&self, events: Vec<Result<ChatEvent, String>>) {
        self.scripts.lock().unwrap().chat.push_back(events);
    }

    /// Enqueue a chat reply split into deltas followed by Done
    pub fn push_chat_reply(&self, chunks: &[&str]) {
        let mut events: Vec<Result<ChatEvent, String>> = chunks
            .iter()
            .map(|c| {
                Ok(ChatEvent::Delta {
                    text: (*c).to_string(),
                    grounding_chunks: Vec::new(),
                })
            })
            .collect();
        events.push(Ok(ChatEvent::Done));
        self.push_chat_script(events);
    }

    /// All calls recorded so far
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls recorded so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AiGateway for MockGateway {
    async fn generate_text(&self, request: TextRequest) -> TextResponse {
        self.calls.lock().unwrap().push(RecordedCall::Text {
            prompt: request.prompt.clone(),
            system_instruction: request.system_instruction.clone(),
            web_grounding: request.web_grounding,
        });
        self.scripts
            .lock()
            .unwrap()
            .text
            .pop_front()
            .unwrap_or_else(|| TextResponse {
                text: "Error generating text: mock script exhausted".to_string(),
                error: Some("mock script exhausted".to_string()),
                grounding_chunks: Vec::new(),
            })
    }

    async fn generate_json(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> JsonResponse {
        self.calls.lock().unwrap().push(RecordedCall::Json {
            prompt: prompt.to_string(),
            system_instruction: system_instruction.map(ToString::to_string),
        });
        self.scripts
            .lock()
            .unwrap()
            .json
            .pop_front()
            .unwrap_or_else(|| JsonResponse {
                data: None,
                error: Some("mock script exhausted".to_string()),
                raw_text: None,
            })
    }

    async fn stream_chat(
        &self,
        history: Vec<ChatTurn>,
        new_message: &str,
        _options: ChatOptions,
    ) -> ChatStream {
        self.calls.lock().unwrap().push(RecordedCall::Chat {
            history_len: history.len(),
            new_message: new_message.to_string(),
        });
        let script = self
            .scripts
            .lock()
            .unwrap()
            .chat
            .pop_front()
            .unwrap_or_else(|| vec![Err("mock script exhausted".to_string())]);
        ChatStream::from_items(script)
    }
}
