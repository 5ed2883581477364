//! Response generator - conditions the language model on the policy's
//! directive and a bounded slice of recent dialogue.

use agent_rules::{AgentConfig, Directive, SessionState, Speaker};

use crate::client::{ChatClient, ChatMessage, ChatRequest, ChatReply};
use crate::error::ClientError;

const GENERATION_TEMPERATURE: f32 = 0.7;
const GENERATION_MAX_TOKENS: u32 = 250;

/// The generator borrows the shared config and backend for one session.
///
/// Pure with respect to session state: committing the exchange to the
/// transcript is the orchestrator's job, after the call succeeds.
pub struct ResponseGenerator<'a, C: ChatClient> {
    config: &'a AgentConfig,
    client: &'a C,
}

impl<'a, C: ChatClient> ResponseGenerator<'a, C> {
    pub fn new(config: &'a AgentConfig, client: &'a C) -> Self {
        Self { config, client }
    }

    /// Produce the agent's utterance for this turn.
    pub fn generate(
        &self,
        directive: &Directive,
        state: &SessionState,
        player_text: &str,
    ) -> Result<ChatReply, ClientError> {
        let mut messages =
            vec![ChatMessage::system(self.system_instruction(directive, state))];
        for entry in state.recent_history(self.config.history_window) {
            messages.push(match entry.speaker {
                Speaker::Player => ChatMessage::user(entry.text.clone()),
                Speaker::Agent => ChatMessage::assistant(entry.text.clone()),
            });
        }
        messages.push(ChatMessage::user(player_text));

        self.client.complete(&ChatRequest {
            messages,
            temperature: GENERATION_TEMPERATURE,
            max_tokens: GENERATION_MAX_TOKENS,
        })
    }

    /// Compose the hybrid system instruction: fixed persona rules, the
    /// current directive, and a numeric state readout.
    fn system_instruction(&self, directive: &Directive, state: &SessionState) -> String {
        format!(
            "{persona}\n\n{instruction}\n\nCurrent suspicion level: {suspicion:.2}\nDeal state: {deal_state:?}",
            persona = self.config.persona,
            instruction = directive.instruction,
            suspicion = state.suspicion(),
            deal_state = state.deal_state,
        )
    }
}
