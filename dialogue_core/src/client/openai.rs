//! OpenAI-compatible chat-completion backend over blocking HTTP.

use std::time::Duration;

use serde::Deserialize;

use super::{ChatClient, ChatReply, ChatRequest};
use crate::error::ClientError;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for any `/chat/completions`-shaped service.
pub struct OpenAiChatClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiChatClient {
    /// Create a client against the default OpenAI endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(DEFAULT_TIMEOUT).build(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point the client at a different compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Use a different model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

impl ChatClient for OpenAiChatClient {
    fn complete(&self, request: &ChatRequest) -> Result<ChatReply, ClientError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Accept", "application/json")
            .send_json(payload)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => ClientError::Status(code),
                ureq::Error::Transport(transport) => {
                    ClientError::Transport(transport.to_string())
                }
            })?;

        let body: CompletionBody = serde_json::from_reader(response.into_reader())
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ClientError::Malformed("empty choices array".to_string()))?;

        // This backend is prose-only; terminal promotion falls back to the
        // marker scan in the orchestrator.
        Ok(ChatReply::text_only(text.trim().to_string()))
    }
}
