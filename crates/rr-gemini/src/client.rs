//! Gemini REST client
//!
//! Implements [`AiGateway`] over the Generative Language API. A missing API
//! key short-circuits every call with a fixed configuration error and no
//! network attempt.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::config::GeminiConfig;
use crate::gateway::AiGateway;
use crate::json::strip_code_fence;
use crate::stream::ChatStream;
use crate::types::{
    ChatEvent, ChatOptions, ChatRole, ChatTurn, JsonResponse, ReasoningBudget, TextRequest,
    TextResponse, WireChunk, WireErrorBody,
};

/// Fixed message for an unconfigured gateway
pub const MISSING_KEY_ERROR: &str = "API_KEY is not configured.";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini-backed gateway
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a client for the given configuration
    #[must_use]
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client configured from the environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GeminiConfig::from_env())
    }

    /// Create a client with a custom HTTP client
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// Whether an API key is configured
    #[inline]
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn endpoint(&self, verb: &str) -> String {
        format!("{}/{}:{verb}", self.config.base_url, self.config.model)
    }

    /// Build the request body shared by all three calls
    fn build_body(
        contents: Vec<ChatTurn>,
        system_instruction: Option<&str>,
        reasoning_budget: ReasoningBudget,
        web_grounding: bool,
        json_output: bool,
    ) -> Value {
        let contents: Vec<Value> = contents
            .into_iter()
            .map(|turn| {
                let role = match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                };
                json!({ "role": role, "parts": [{ "text": turn.text }] })
            })
            .collect();

        let mut body = json!({ "contents": contents });

        if let Some(instruction) = system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
        }

        let mut gen_config = json!({});
        if reasoning_budget == ReasoningBudget::Minimal {
            gen_config["thinkingConfig"] = json!({ "thinkingBudget": 0 });
        }
        // googleSearch grounding and JSON output are mutually exclusive
        if web_grounding {
            body["tools"] = json!([{ "googleSearch": {} }]);
        } else if json_output {
            gen_config["responseMimeType"] = json!("application/json");
        }
        if let Some(map) = gen_config.as_object() {
            if !map.is_empty() {
                body["generationConfig"] = gen_config;
            }
        }

        body
    }

    /// Single-shot generate call, folding all failures into a message string
    async fn post_generate(&self, api_key: &str, body: &Value) -> Result<WireChunk, String> {
        let response = self
            .client
            .post(self.endpoint("generateContent"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<WireErrorBody>(&text) {
                Ok(parsed) => parsed.error.message,
                Err(_) if !text.is_empty() => text,
                Err(_) => format!("HTTP {status}"),
            };
            warn!(status = %status, "provider returned error");
            return Err(message);
        }

        let chunk: WireChunk = response.json().await.map_err(|e| e.to_string())?;
        if let Some(feedback) = &chunk.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(format!("Prompt blocked: {reason}"));
            }
        }
        Ok(chunk)
    }
}

#[async_trait]
impl AiGateway for GeminiClient {
    async fn generate_text(&self, request: TextRequest) -> TextResponse {
        let Some(api_key) = self.config.api_key.clone() else {
            return TextResponse {
                text: format!("Error: {MISSING_KEY_ERROR}"),
                error: Some("API_KEY not configured".to_string()),
                grounding_chunks: Vec::new(),
            };
        };

        let body = Self::build_body(
            vec![ChatTurn::user(request.prompt)],
            request.system_instruction.as_deref(),
            request.reasoning_budget,
            request.web_grounding,
            false,
        );

        match self.post_generate(&api_key, &body).await {
            Ok(chunk) => {
                debug!("text generation succeeded");
                TextResponse {
                    text: chunk.text(),
                    error: None,
                    grounding_chunks: chunk.grounding_chunks(),
                }
            }
            Err(message) => {
                error!(error = %message, "text generation failed");
                TextResponse {
                    text: format!("Error generating text: {message}"),
                    error: Some(message),
                    grounding_chunks: Vec::new(),
                }
            }
        }
    }

    async fn generate_json(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> JsonResponse {
        let Some(api_key) = self.config.api_key.clone() else {
            return JsonResponse {
                data: None,
                error: Some(MISSING_KEY_ERROR.to_string()),
                raw_text: None,
            };
        };

        let body = Self::build_body(
            vec![ChatTurn::user(prompt)],
            system_instruction,
            ReasoningBudget::Default,
            false,
            true,
        );

        let raw_text = match self.post_generate(&api_key, &body).await {
            Ok(chunk) => chunk.text(),
            Err(message) => {
                error!(error = %message, "JSON generation failed");
                return JsonResponse {
                    data: None,
                    error: Some(message),
                    raw_text: None,
                };
            }
        };

        let stripped = strip_code_fence(&raw_text);
        match serde_json::from_str::<Value>(&stripped) {
            Ok(value) => JsonResponse {
                data: Some(value),
                error: None,
                raw_text: Some(raw_text),
            },
            Err(e) => {
                error!(error = %e, "failed to parse AI JSON response");
                JsonResponse {
                    data: None,
                    error: Some("Failed to parse AI JSON response.".to_string()),
                    raw_text: Some(raw_text),
                }
            }
        }
    }

    async fn stream_chat(
        &self,
        history: Vec<ChatTurn>,
        new_message: &str,
        options: ChatOptions,
    ) -> ChatStream {
        let Some(api_key) = self.config.api_key.clone() else {
            return ChatStream::failed(MISSING_KEY_ERROR);
        };

        let mut contents = history;
        contents.push(ChatTurn::user(new_message));
        let body = Self::build_body(
            contents,
            options.system_instruction.as_deref(),
            options.reasoning_budget,
            false,
            false,
        );

        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(API_KEY_HEADER, &api_key)
            .json(&body);

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    let _ = tx.send(Err(e.to_string())).await;
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let message = match serde_json::from_str::<WireErrorBody>(&text) {
                    Ok(parsed) => parsed.error.message,
                    Err(_) if !text.is_empty() => text,
                    Err(_) => format!("HTTP {status}"),
                };
                let _ = tx.send(Err(message)).await;
                return;
            }

            let mut stream = response.bytes_stream();
            let mut buffer = String::new();
            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(Err(e.to_string())).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim().to_string();
                    buffer.drain(..=pos);
                    if line.is_empty() {
                        continue;
                    }
                    let json_str = line.strip_prefix("data: ").unwrap_or(&line).trim();
                    if json_str.is_empty() || matches!(json_str, "[" | "]" | ",") {
                        continue;
                    }
                    let parsed: WireChunk = match serde_json::from_str(json_str) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            // Possibly partial data; keep reading
                            debug!(error = %e, "skipping unparseable stream line");
                            continue;
                        }
                    };
                    if let Some(feedback) = &parsed.prompt_feedback {
                        if let Some(reason) = &feedback.block_reason {
                            let _ = tx.send(Err(format!("Prompt blocked: {reason}"))).await;
                            return;
                        }
                    }
                    let text = parsed.text();
                    if !text.is_empty() {
                        let event = ChatEvent::Delta {
                            text,
                            grounding_chunks: parsed.grounding_chunks(),
                        };
                        if tx.send(Ok(event)).await.is_err() {
                            // Receiver dropped
                            return;
                        }
                    }
                }
            }

            let _ = tx.send(Ok(ChatEvent::Done)).await;
        });

        ChatStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    fn unconfigured() -> GeminiClient {
        GeminiClient::new(GeminiConfig::default())
    }

    #[tokio::test]
    async fn missing_key_text_is_fixed_error() {
        let response = unconfigured().generate_text(TextRequest::new("hi")).await;
        assert_eq!(response.text, "Error: API_KEY is not configured.");
        assert_eq!(response.error.as_deref(), Some("API_KEY not configured"));
        assert!(response.grounding_chunks.is_empty());
    }

    #[tokio::test]
    async fn missing_key_json_is_fixed_error() {
        let response = unconfigured().generate_json("hi", None).await;
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some(MISSING_KEY_ERROR));
        assert!(response.raw_text.is_none());
    }

    #[tokio::test]
    async fn missing_key_stream_errors_once() {
        let stream = unconfigured()
            .stream_chat(Vec::new(), "hi", ChatOptions::default())
            .await;
        let events: Vec<_> = stream.collect().await;
        assert_eq!(events, vec![Err(MISSING_KEY_ERROR.to_string())]);
    }

    #[test]
    fn body_includes_system_instruction_and_contents() {
        let body = GeminiClient::build_body(
            vec![ChatTurn::user("question")],
            Some("be terse"),
            ReasoningBudget::Default,
            false,
            false,
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "question");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be terse");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn minimal_reasoning_zeroes_thinking_budget() {
        let body = GeminiClient::build_body(
            vec![ChatTurn::user("q")],
            None,
            ReasoningBudget::Minimal,
            false,
            false,
        );
        assert_eq!(
            body["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            0
        );
    }

    #[test]
    fn grounding_excludes_json_mime_type() {
        let body = GeminiClient::build_body(
            vec![ChatTurn::user("q")],
            None,
            ReasoningBudget::Default,
            true,
            true,
        );
        assert!(body["tools"][0].get("googleSearch").is_some());
        assert!(body
            .get("generationConfig")
            .and_then(|c| c.get("responseMimeType"))
            .is_none());
    }

    #[test]
    fn json_output_sets_mime_type() {
        let body = GeminiClient::build_body(
            vec![ChatTurn::user("q")],
            None,
            ReasoningBudget::Default,
            false,
            true,
        );
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn history_precedes_new_message() {
        let body = GeminiClient::build_body(
            vec![
                ChatTurn::user("first"),
                ChatTurn::model("reply"),
                ChatTurn::user("second"),
            ],
            None,
            ReasoningBudget::Default,
            false,
            false,
        );
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "second");
    }

    #[test]
    fn endpoint_includes_model_and_verb() {
        let client = GeminiClient::new(
            GeminiConfig::default().with_base_url("http://localhost:1/v1beta/models"),
        );
        assert_eq!(
            client.endpoint("generateContent"),
            "http://localhost:1/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
