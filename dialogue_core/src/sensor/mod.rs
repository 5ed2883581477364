//! Intent sensor - classifies a player utterance into the closed tag set.
//!
//! Two tiers, resolved in order:
//! 1. Deterministic lexicon screen. Danger and hostility terms must never be
//!    misread, so they are matched locally before any model call and never
//!    depend on the external service.
//! 2. Semantic fallback. A zero-temperature classifier call constrained to
//!    the closed label set, with a small output cap so the reply is just the
//!    label. Any failure here degrades to the neutral `Chat` signal:
//!    classification is advisory, not safety-critical.

use agent_rules::{AgentConfig, IntentSignal, IntentTag, Urgency};
use tracing::{debug, warn};

use crate::client::{ChatClient, ChatMessage, ChatRequest};

const CLASSIFIER_TEMPERATURE: f32 = 0.0;
const CLASSIFIER_MAX_TOKENS: u32 = 10;

/// The sensor borrows the shared config and backend for one session.
pub struct IntentSensor<'a, C: ChatClient> {
    config: &'a AgentConfig,
    client: &'a C,
}

impl<'a, C: ChatClient> IntentSensor<'a, C> {
    pub fn new(config: &'a AgentConfig, client: &'a C) -> Self {
        Self { config, client }
    }

    /// Classify one utterance. Total: always returns a signal.
    pub fn classify(&self, text: &str) -> IntentSignal {
        // Tier 1: lexicon overrides. Danger beats hostility.
        if self.config.lexicons.danger_match(text) {
            debug!(tag = %IntentTag::Threat, "danger lexicon hit");
            return IntentSignal::with_urgency(IntentTag::Threat, Urgency::High);
        }
        if self.config.lexicons.hostility_match(text) {
            debug!(tag = %IntentTag::Hostile, "hostility lexicon hit");
            return IntentSignal::with_urgency(IntentTag::Hostile, Urgency::High);
        }

        // Tier 2: semantic fallback, failing soft to neutral.
        match self.classify_semantic(text) {
            Ok(Some(signal)) => signal,
            Ok(None) => {
                warn!("classifier returned an unknown label; defaulting to CHAT");
                IntentSignal::neutral()
            }
            Err(error) => {
                warn!(%error, "classifier call failed; defaulting to CHAT");
                IntentSignal::neutral()
            }
        }
    }

    fn classify_semantic(
        &self,
        text: &str,
    ) -> Result<Option<IntentSignal>, crate::error::ClientError> {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system("You are a strict intent classifier."),
                ChatMessage::user(classifier_prompt(text)),
            ],
            temperature: CLASSIFIER_TEMPERATURE,
            max_tokens: CLASSIFIER_MAX_TOKENS,
        };
        let reply = self.client.complete(&request)?;
        Ok(IntentSignal::parse_label(&reply.text))
    }
}

/// Build the classifier prompt: the closed label set with one-line
/// descriptions, then the utterance. The model must answer with the tag
/// alone, optionally qualified with HIGH or LOW.
fn classifier_prompt(text: &str) -> String {
    let mut prompt = String::from(
        "Analyze the player's intention and answer with EXACTLY one tag from \
         this list, optionally followed by HIGH or LOW:\n",
    );
    for tag in [
        IntentTag::Buy,
        IntentTag::Probe,
        IntentTag::Tech,
        IntentTag::Hostile,
        IntentTag::Threat,
        IntentTag::Chat,
    ] {
        prompt.push_str(&format!("- {}: {}\n", tag.label(), tag.description()));
    }
    prompt.push_str(&format!("\nInput: \"{}\"", text));
    prompt
}
