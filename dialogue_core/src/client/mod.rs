//! Chat-service abstraction: the request/reply types every backend speaks,
//! plus the trait the sensor and generator program against.

mod openai;

pub use openai::*;

use agent_rules::DealOutcome;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Message roles understood by chat-completion services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// One chat-completion reply.
///
/// `terminal_hint` is the structured terminal contract: backends that can
/// report an explicit deal outcome set it, and the orchestrator then skips
/// the legacy marker scan on the utterance text entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub terminal_hint: Option<DealOutcome>,
}

impl ChatReply {
    /// A plain-text reply with no structured terminal signal.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            terminal_hint: None,
        }
    }
}

/// A blocking chat-completion backend.
///
/// Both external calls of a turn (classification and generation) go through
/// this seam, which is also where tests substitute scripted doubles.
pub trait ChatClient {
    fn complete(&self, request: &ChatRequest) -> Result<ChatReply, ClientError>;
}
