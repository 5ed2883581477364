//! Turn orchestrator - sequences sensor, policy, generation, and state
//! commit for one session.
//!
//! The orchestrator owns the blackboard exclusively. Each turn runs on a
//! staged copy of the state; the copy is committed only after generation
//! succeeds, so a failed service call never leaves a half-applied turn.

use agent_rules::{
    decide, detect_outcome, AgentConfig, DealOutcome, DealState, DialogueEntry, Directive,
    IntentSignal, Mood, SessionId, SessionState,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::ChatClient;
use crate::error::TurnError;
use crate::generator::ResponseGenerator;
use crate::sensor::IntentSensor;

/// Serializable view of the blackboard for the display surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub id: SessionId,
    pub suspicion: f32,
    pub mood: Mood,
    pub deal_state: DealState,
    pub last_intent: Option<IntentSignal>,
    pub turn_count: u32,
    pub terminal: bool,
}

impl StateSnapshot {
    fn of(state: &SessionState) -> Self {
        Self {
            id: state.id,
            suspicion: state.suspicion(),
            mood: state.mood,
            deal_state: state.deal_state,
            last_intent: state.last_intent,
            turn_count: state.turn_count,
            terminal: state.is_terminal(),
        }
    }
}

/// Everything the display surface needs to render one completed turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub utterance: String,
    pub directive: Directive,
    pub state: StateSnapshot,
}

/// One dialogue session: the blackboard plus the shared config and backend.
///
/// Sessions never share mutable state; run one `Session` per concurrent
/// dialogue. Turns are strictly sequential (`submit` takes `&mut self`).
pub struct Session<C: ChatClient> {
    config: AgentConfig,
    client: C,
    state: SessionState,
}

impl<C: ChatClient> Session<C> {
    pub fn new(config: AgentConfig, client: C) -> Self {
        let state = SessionState::new(config.initial_suspicion);
        Self {
            config,
            client,
            state,
        }
    }

    /// Run one full turn: sensor -> policy -> generation -> commit.
    pub fn submit(&mut self, player_text: &str) -> Result<TurnReport, TurnError> {
        if self.state.is_terminal() {
            return Err(TurnError::SessionTerminal(self.state.deal_state));
        }

        let sensor = IntentSensor::new(&self.config, &self.client);
        let signal = sensor.classify(player_text);
        debug!(session = %self.state.id, tag = %signal.tag, "sensed intent");

        // Decide on a staged copy so a failed generation commits nothing.
        let mut staged = self.state.clone();
        staged.last_intent = Some(signal);
        let directive = decide(signal, &mut staged, &self.config);
        debug!(session = %self.state.id, kind = ?directive.kind, "chose directive");

        let generator = ResponseGenerator::new(&self.config, &self.client);
        let reply = generator.generate(&directive, &staged, player_text)?;

        // Commit: transcript, turn count, then terminal promotion from the
        // structured hint or the legacy marker scan.
        staged.push_exchange(player_text, reply.text.clone());
        staged.turn_count += 1;

        let outcome = reply
            .terminal_hint
            .or_else(|| detect_outcome(&reply.text, &self.config.markers));
        match outcome {
            Some(DealOutcome::Closed) if staged.deal_state == DealState::Negotiating => {
                info!(session = %staged.id, "deal closed");
                staged.deal_state = DealState::Closed;
            }
            Some(DealOutcome::Disengaged) => {
                info!(session = %staged.id, "agent disengaged");
                staged.deal_state = DealState::Burned;
            }
            _ => {}
        }

        self.state = staged;
        Ok(TurnReport {
            utterance: reply.text,
            directive,
            state: StateSnapshot::of(&self.state),
        })
    }

    /// Current blackboard snapshot for rendering.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::of(&self.state)
    }

    /// Full retained transcript, for terminal-state display.
    pub fn transcript(&self) -> &[DialogueEntry] {
        self.state.history()
    }

    /// Restore the session to its starting defaults. The only operation
    /// accepted once the deal state is terminal.
    pub fn reset(&mut self) {
        info!(session = %self.state.id, "session reset");
        self.state.reset(self.config.initial_suspicion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatReply, ChatRequest};
    use crate::error::ClientError;
    use agent_rules::{DirectiveKind, IntentTag};
    use std::cell::RefCell;

    /// Scripted backend: first reply answers the classifier call, second
    /// answers the generation call, repeating per turn.
    struct ScriptedClient {
        replies: RefCell<Vec<ChatReply>>,
        calls: RefCell<u32>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<ChatReply>) -> Self {
            Self {
                replies: RefCell::new(replies),
                calls: RefCell::new(0),
            }
        }

        fn turn(label: &str, utterance: &str) -> Vec<ChatReply> {
            vec![
                ChatReply::text_only(label),
                ChatReply::text_only(utterance),
            ]
        }

        fn call_count(&self) -> u32 {
            *self.calls.borrow()
        }
    }

    impl ChatClient for ScriptedClient {
        fn complete(&self, _request: &ChatRequest) -> Result<ChatReply, ClientError> {
            *self.calls.borrow_mut() += 1;
            let mut replies = self.replies.borrow_mut();
            if replies.is_empty() {
                return Err(ClientError::Malformed("script exhausted".to_string()));
            }
            Ok(replies.remove(0))
        }
    }

    /// Classifier succeeds, generation fails.
    struct GenerationFailsClient {
        calls: RefCell<u32>,
    }

    impl ChatClient for GenerationFailsClient {
        fn complete(&self, _request: &ChatRequest) -> Result<ChatReply, ClientError> {
            let mut calls = self.calls.borrow_mut();
            *calls += 1;
            if *calls == 1 {
                Ok(ChatReply::text_only("BUY"))
            } else {
                Err(ClientError::Status(503))
            }
        }
    }

    #[test]
    fn test_full_buy_turn() {
        let client = ScriptedClient::new(ScriptedClient::turn(
            "BUY",
            "Two hundred. Cash only, and keep your voice down.",
        ));
        let mut session = Session::new(AgentConfig::default(), client);

        let report = session.submit("quero comprar").unwrap();

        assert_eq!(report.directive.kind, DirectiveKind::DiscloseOffer);
        assert!(report.directive.instruction.contains("200"));
        assert_eq!(report.state.deal_state, DealState::Negotiating);
        assert_eq!(report.state.turn_count, 1);
        assert_eq!(
            report.state.last_intent.map(|s| s.tag),
            Some(IntentTag::Buy)
        );
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn test_danger_term_burns_in_one_turn() {
        // Lexicon hit: only the generation call reaches the service
        let client = ScriptedClient::new(vec![ChatReply::text_only(
            "Wrong station, friend. We never talked.",
        )]);
        let mut session = Session::new(AgentConfig::default(), client);

        let report = session.submit("relax, I'm not with the police").unwrap();

        assert_eq!(report.directive.kind, DirectiveKind::Disengage);
        assert_eq!(report.state.deal_state, DealState::Burned);
        assert_eq!(report.state.suspicion, 1.0);
        assert!(report.state.terminal);
    }

    #[test]
    fn test_terminal_session_rejects_submit() {
        let client = ScriptedClient::new(vec![ChatReply::text_only("Gone.")]);
        let mut session = Session::new(AgentConfig::default(), client);
        session.submit("police!").unwrap();

        let calls_after_burn = session.client.call_count();
        let err = session.submit("wait, come back").unwrap_err();

        assert!(matches!(err, TurnError::SessionTerminal(DealState::Burned)));
        assert_eq!(session.snapshot().turn_count, 1);
        // Rejected at the boundary: no service calls were made
        assert_eq!(session.client.call_count(), calls_after_burn);
    }

    #[test]
    fn test_generation_failure_commits_nothing() {
        let client = GenerationFailsClient {
            calls: RefCell::new(0),
        };
        let mut session = Session::new(AgentConfig::default(), client);
        let before = session.snapshot();

        let err = session.submit("quero comprar").unwrap_err();

        assert!(matches!(
            err,
            TurnError::Generation(ClientError::Status(503))
        ));
        let after = session.snapshot();
        assert_eq!(after.deal_state, before.deal_state);
        assert_eq!(after.turn_count, 0);
        assert!(after.last_intent.is_none());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_classifier_failure_still_completes_turn() {
        // Classifier errors, generation succeeds
        struct ClassifierFailsClient {
            calls: RefCell<u32>,
        }
        impl ChatClient for ClassifierFailsClient {
            fn complete(&self, _request: &ChatRequest) -> Result<ChatReply, ClientError> {
                let mut calls = self.calls.borrow_mut();
                *calls += 1;
                if *calls == 1 {
                    Err(ClientError::Transport("timeout".to_string()))
                } else {
                    Ok(ChatReply::text_only("Trains are late again. Typical."))
                }
            }
        }

        let client = ClassifierFailsClient {
            calls: RefCell::new(0),
        };
        let mut session = Session::new(AgentConfig::default(), client);

        let report = session.submit("hm.").unwrap();

        assert_eq!(report.directive.kind, DirectiveKind::Flavor);
        assert_eq!(
            report.state.last_intent.map(|s| s.tag),
            Some(IntentTag::Chat)
        );
        assert_eq!(report.state.turn_count, 1);
    }

    #[test]
    fn test_closing_marker_promotes_closed() {
        let mut replies = ScriptedClient::turn("BUY", "Two hundred. Take it or leave it.");
        replies.extend(ScriptedClient::turn(
            "BUY",
            "Fine. We have a deal. Platform two, ten minutes.",
        ));
        let client = ScriptedClient::new(replies);
        let mut session = Session::new(AgentConfig::default(), client);

        session.submit("how much?").unwrap();
        let report = session.submit("I'll take it").unwrap();

        assert_eq!(report.state.deal_state, DealState::Closed);
        assert!(report.state.terminal);
    }

    #[test]
    fn test_closing_marker_ignored_outside_negotiation() {
        // Flavor turn whose prose happens to contain a closing phrase
        let client = ScriptedClient::new(ScriptedClient::turn(
            "CHAT",
            "Heh. Everyone thinks we have a deal before we even talk numbers.",
        ));
        let mut session = Session::new(AgentConfig::default(), client);

        let report = session.submit("nice evening").unwrap();

        assert_eq!(report.state.deal_state, DealState::Idle);
        assert!(!report.state.terminal);
    }

    #[test]
    fn test_disengage_marker_burns_post_generation() {
        let client = ScriptedClient::new(ScriptedClient::turn(
            "CHAT",
            "You know what? This conversation is over.",
        ));
        let mut session = Session::new(AgentConfig::default(), client);

        let report = session.submit("you look nervous").unwrap();

        assert_eq!(report.state.deal_state, DealState::Burned);
    }

    #[test]
    fn test_structured_hint_beats_marker_scan() {
        // The utterance contains no marker phrase at all; only the hint
        // carries the outcome.
        struct HintingClient {
            calls: RefCell<u32>,
        }
        impl ChatClient for HintingClient {
            fn complete(&self, _request: &ChatRequest) -> Result<ChatReply, ClientError> {
                let mut calls = self.calls.borrow_mut();
                *calls += 1;
                if *calls == 1 {
                    Ok(ChatReply::text_only("BUY"))
                } else {
                    Ok(ChatReply {
                        text: "Alright. Pleasure doing business.".to_string(),
                        terminal_hint: Some(DealOutcome::Closed),
                    })
                }
            }
        }

        let client = HintingClient {
            calls: RefCell::new(0),
        };
        let mut session = Session::new(AgentConfig::default(), client);

        let report = session.submit("deal, here's the cash").unwrap();

        assert_eq!(report.state.deal_state, DealState::Closed);
    }

    #[test]
    fn test_suspicion_monotone_across_turns() {
        let mut replies = ScriptedClient::turn("HOSTILE", "Watch your mouth.");
        replies.extend(ScriptedClient::turn("CHAT", "Hmph."));
        replies.extend(ScriptedClient::turn("PROBE", "Who's asking?"));
        let client = ScriptedClient::new(replies);
        let mut session = Session::new(AgentConfig::default(), client);

        let mut last = session.snapshot().suspicion;
        for text in ["you're pathetic", "fine, fine", "who do you work for?"] {
            let report = session.submit(text).unwrap();
            assert!(report.state.suspicion >= last);
            last = report.state.suspicion;
        }
    }

    #[test]
    fn test_reset_reopens_a_burned_session() {
        let client = ScriptedClient::new(vec![ChatReply::text_only("Gone.")]);
        let mut session = Session::new(AgentConfig::default(), client);
        session.submit("police!").unwrap();
        assert!(session.snapshot().terminal);

        session.reset();

        let snapshot = session.snapshot();
        assert!(!snapshot.terminal);
        assert_eq!(snapshot.deal_state, DealState::Idle);
        assert_eq!(snapshot.suspicion, AgentConfig::default().initial_suspicion);
        assert!(session.transcript().is_empty());
    }
}
