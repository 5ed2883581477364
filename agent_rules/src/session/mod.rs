//! Session state - the blackboard holding one dialogue's mental state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::IntentSignal;

/// Unique identifier for dialogue sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The agent's mood after the last decision. Advisory context for the
/// generator; the policy never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mood {
    #[default]
    Neutral,
    Tense,
    Greedy,
    Aggressive,
}

/// The negotiation state machine.
///
/// `Idle -> Negotiating -> {Closed | Burned}`; `Burned` is reachable from any
/// state through the safety branch. `Closed` and `Burned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DealState {
    #[default]
    Idle,
    Negotiating,
    Closed,
    Burned,
}

impl DealState {
    /// Terminal states admit no further policy evaluation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DealState::Closed | DealState::Burned)
    }
}

/// Post-generation terminal signal, promoted into `DealState` by the
/// orchestrator once the utterance is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealOutcome {
    /// The agent concluded the deal in-fiction.
    Closed,
    /// The agent walked away from the scene.
    Disengaged,
}

/// Who said a line of dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Player,
    Agent,
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl DialogueEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// The blackboard: all mutable mental state for one dialogue session.
///
/// Owned by the turn orchestrator; mutated only by the behavior policy and
/// by terminal-state promotion after generation. Suspicion only ever moves
/// upward (through [`raise_suspicion`](Self::raise_suspicion) and
/// [`force_max_suspicion`](Self::force_max_suspicion)) until a reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,

    /// Accumulated paranoia/distrust, 0.0 to 1.0. Never decreases except on
    /// reset.
    suspicion: f32,

    pub mood: Mood,

    pub deal_state: DealState,

    /// One-shot flag: the price has been disclosed, do not repeat the offer.
    pub revealed_price: bool,

    /// Most recent sensor output. Informational.
    pub last_intent: Option<IntentSignal>,

    /// Completed turns in this session.
    pub turn_count: u32,

    /// Append-only transcript. The full sequence is retained for terminal
    /// display; only a bounded recent window is forwarded to the generator.
    history: Vec<DialogueEntry>,
}

impl SessionState {
    /// Create a fresh session with the given starting suspicion.
    pub fn new(initial_suspicion: f32) -> Self {
        Self {
            id: SessionId::new(),
            suspicion: initial_suspicion.clamp(0.0, 1.0),
            mood: Mood::default(),
            deal_state: DealState::default(),
            revealed_price: false,
            last_intent: None,
            turn_count: 0,
            history: Vec::new(),
        }
    }

    /// Current suspicion level.
    pub fn suspicion(&self) -> f32 {
        self.suspicion
    }

    /// Raise suspicion by `amount`, saturating at 1.0. Negative amounts are
    /// ignored to preserve monotonicity.
    pub fn raise_suspicion(&mut self, amount: f32) {
        if amount > 0.0 {
            self.suspicion = (self.suspicion + amount).min(1.0);
        }
    }

    /// Pin suspicion at the maximum. Used by the safety branch on hard
    /// danger signals.
    pub fn force_max_suspicion(&mut self) {
        self.suspicion = 1.0;
    }

    /// Whether this session has reached a terminal deal state.
    pub fn is_terminal(&self) -> bool {
        self.deal_state.is_terminal()
    }

    /// Full retained transcript.
    pub fn history(&self) -> &[DialogueEntry] {
        &self.history
    }

    /// The most recent `window` transcript entries, oldest first.
    pub fn recent_history(&self, window: usize) -> &[DialogueEntry] {
        let start = self.history.len().saturating_sub(window);
        &self.history[start..]
    }

    /// Append one completed player/agent exchange to the transcript.
    pub fn push_exchange(&mut self, player_text: impl Into<String>, agent_text: impl Into<String>) {
        self.history
            .push(DialogueEntry::new(Speaker::Player, player_text));
        self.history
            .push(DialogueEntry::new(Speaker::Agent, agent_text));
    }

    /// Restore defaults, keeping the session identity. The only permitted
    /// operation once a terminal state is reached.
    pub fn reset(&mut self, initial_suspicion: f32) {
        let id = self.id;
        *self = SessionState::new(initial_suspicion);
        self.id = id;
    }
}
