//! Behavior policy - the priority decision tree over the blackboard.
//!
//! Evaluation order: safety > hostility > tech > negotiation > probe > idle.
//! The cascade is short-circuit: the first matching branch wins, mutates the
//! state, and produces the turn's directive. Safety dominates every other
//! concern; business progression is suppressed under elevated risk; idle
//! flavor is the total fallback.

use serde::{Deserialize, Serialize};

use crate::config::{AgentConfig, OutcomeMarkers};
use crate::intent::{IntentSignal, IntentTag};
use crate::session::{DealOutcome, DealState, Mood, SessionState};

/// Which policy branch produced a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveKind {
    /// Safety branch: cut the conversation and leave.
    Disengage,
    /// Hostility branch: confrontational pushback.
    Pushback,
    /// Tech/meta branch: paranoid in-fiction deflection.
    Deflect,
    /// Negotiation branch, first pass: name the price.
    DiscloseOffer,
    /// Negotiation branch, later passes: drive toward closing.
    PressToClose,
    /// Negotiation branch under elevated suspicion: defer the deal.
    StallDeal,
    /// Probe branch: evasive, testing the player's intent.
    Evade,
    /// Idle branch: ambient color.
    Flavor,
}

/// The policy's per-turn instruction for the generator. Transient: consumed
/// immediately, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub instruction: String,
}

impl Directive {
    fn new(kind: DirectiveKind, instruction: impl Into<String>) -> Self {
        Self {
            kind,
            instruction: instruction.into(),
        }
    }
}

/// Walk the priority tree once and decide this turn's directive, mutating
/// the blackboard as a side effect of the chosen branch.
///
/// Deterministic given `(signal, state, config)`. Callers are expected to
/// refuse evaluation for terminal sessions; if called anyway with a `Burned`
/// state the safety branch answers idempotently. `Closed` is the one state
/// the tree never overrides on its own: closing is a post-generation
/// promotion, not a policy decision.
pub fn decide(signal: IntentSignal, state: &mut SessionState, config: &AgentConfig) -> Directive {
    let templates = &config.directives;

    // Branch 1: safety. Hard danger, accumulated risk, or an already-burned
    // session all land here, and the session stays burned forever after.
    if signal.tag == IntentTag::Threat
        || state.suspicion() >= config.thresholds.safety
        || state.deal_state == DealState::Burned
    {
        if signal.tag == IntentTag::Threat {
            state.force_max_suspicion();
        }
        state.deal_state = DealState::Burned;
        return Directive::new(DirectiveKind::Disengage, templates.disengage.clone());
    }

    // Branch 2: hostility
    if signal.tag == IntentTag::Hostile {
        state.raise_suspicion(config.increments.hostility);
        state.mood = Mood::Aggressive;
        return Directive::new(DirectiveKind::Pushback, templates.pushback.clone());
    }

    // Branch 3: tech/meta. Keeps the fiction intact by treating the slip as
    // a corrupted signal.
    if signal.tag == IntentTag::Tech {
        state.raise_suspicion(config.increments.tech);
        state.mood = Mood::Tense;
        return Directive::new(DirectiveKind::Deflect, templates.deflect.clone());
    }

    // Branch 4: negotiation. Elevated suspicion stalls progress without
    // burning the session: the deal state and the one-shot offer flag are
    // left untouched so a calmer turn can pick the thread back up.
    if signal.tag == IntentTag::Buy || state.deal_state == DealState::Negotiating {
        if state.suspicion() >= config.thresholds.deal_gate {
            return Directive::new(DirectiveKind::StallDeal, templates.stall.clone());
        }
        state.deal_state = DealState::Negotiating;
        state.mood = Mood::Greedy;
        if !state.revealed_price {
            state.revealed_price = true;
            let instruction = templates
                .offer
                .replace("{price}", &config.price.to_string());
            return Directive::new(DirectiveKind::DiscloseOffer, instruction);
        }
        return Directive::new(DirectiveKind::PressToClose, templates.close.clone());
    }

    // Branch 5: probe
    if signal.tag == IntentTag::Probe {
        state.mood = Mood::Tense;
        return Directive::new(DirectiveKind::Evade, templates.evade.clone());
    }

    // Branch 6: idle flavor. No state mutation; keeps the tree total.
    Directive::new(DirectiveKind::Flavor, templates.flavor.clone())
}

/// Scan a generated utterance for terminal marker phrases.
///
/// Legacy fallback for backends that cannot report a structured terminal
/// hint. Disengage markers win over closing markers when both appear.
pub fn detect_outcome(utterance: &str, markers: &OutcomeMarkers) -> Option<DealOutcome> {
    let lowered = utterance.to_lowercase();
    let hit = |phrases: &[String]| {
        phrases
            .iter()
            .any(|phrase| !phrase.is_empty() && lowered.contains(&phrase.to_lowercase()))
    };

    if hit(&markers.disengage) {
        Some(DealOutcome::Disengaged)
    } else if hit(&markers.closing) {
        Some(DealOutcome::Closed)
    } else {
        None
    }
}
