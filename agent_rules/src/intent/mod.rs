//! Intent definitions - the sensor's classification of a player utterance.

use serde::{Deserialize, Serialize};

/// The closed set of intent tags the sensor may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentTag {
    /// Interest in buying or asking about price.
    Buy,

    /// Questions about the agent, the place, or the operation.
    Probe,

    /// Out-of-fiction references (the app, code, bots, files).
    Tech,

    /// Insults or verbal aggression.
    Hostile,

    /// Hard danger: authority or law-enforcement references.
    Threat,

    /// Generic conversation with no clear objective. Neutral fallback.
    Chat,
}

impl IntentTag {
    /// Parse a single classifier label, case-insensitively.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(IntentTag::Buy),
            "PROBE" => Some(IntentTag::Probe),
            "TECH" => Some(IntentTag::Tech),
            "HOSTILE" => Some(IntentTag::Hostile),
            "THREAT" => Some(IntentTag::Threat),
            "CHAT" => Some(IntentTag::Chat),
            _ => None,
        }
    }

    /// Short description used when listing the label set for the classifier.
    pub fn description(&self) -> &'static str {
        match self {
            IntentTag::Buy => "interest in buying the goods or asking about price",
            IntentTag::Probe => "questions about the agent, the place, or the operation",
            IntentTag::Tech => "out-of-fiction terms (app, code, bot, model, file)",
            IntentTag::Hostile => "threats, insults, or aggression",
            IntentTag::Threat => "law enforcement or authority references",
            IntentTag::Chat => "generic conversation with no clear objective",
        }
    }

    /// The wire label for this tag.
    pub fn label(&self) -> &'static str {
        match self {
            IntentTag::Buy => "BUY",
            IntentTag::Probe => "PROBE",
            IntentTag::Tech => "TECH",
            IntentTag::Hostile => "HOSTILE",
            IntentTag::Threat => "THREAT",
            IntentTag::Chat => "CHAT",
        }
    }
}

impl std::fmt::Display for IntentTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Optional urgency qualifier attached to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    High,
    Low,
}

impl Urgency {
    /// Parse an urgency qualifier label, case-insensitively.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Some(Urgency::High),
            "LOW" => Some(Urgency::Low),
            _ => None,
        }
    }
}

/// One classified utterance: a tag plus an optional urgency qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSignal {
    pub tag: IntentTag,
    pub urgency: Option<Urgency>,
}

impl IntentSignal {
    /// Create a signal with no urgency qualifier.
    pub fn of(tag: IntentTag) -> Self {
        Self { tag, urgency: None }
    }

    /// Create a signal with an urgency qualifier.
    pub fn with_urgency(tag: IntentTag, urgency: Urgency) -> Self {
        Self {
            tag,
            urgency: Some(urgency),
        }
    }

    /// The neutral fallback signal used when classification fails.
    pub fn neutral() -> Self {
        Self::of(IntentTag::Chat)
    }

    /// Parse a raw classifier reply: the first token is the tag, an optional
    /// second token is the urgency qualifier. Unknown tags yield `None`;
    /// an unknown second token is ignored.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let mut tokens = raw.split_whitespace();
        let tag = IntentTag::parse(tokens.next()?)?;
        let urgency = tokens.next().and_then(Urgency::parse);
        Some(Self { tag, urgency })
    }
}
