//! Agent configuration: lexicons, thresholds, price, markers, and the
//! per-branch directive templates. Everything has a built-in default so a
//! missing or broken config file is never fatal.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from explicit configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Keyword lists for the sensor's deterministic risk screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLexicon {
    /// Authority/law-enforcement terms. A hit forces a `Threat` signal.
    #[serde(default = "RiskLexicon::default_danger")]
    pub danger: Vec<String>,

    /// Insults and aggression markers. A hit forces a `Hostile` signal.
    #[serde(default = "RiskLexicon::default_hostility")]
    pub hostility: Vec<String>,
}

impl RiskLexicon {
    fn default_danger() -> Vec<String> {
        [
            "police", "cop", "cops", "officer", "badge", "federal", "narc",
            "detective", "precinct", "warrant", "polícia", "delegacia",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn default_hostility() -> Vec<String> {
        ["idiot", "scum", "loser", "punk", "rat", "trash", "otário"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Case-insensitive match of any danger term.
    pub fn danger_match(&self, text: &str) -> bool {
        Self::contains_any(text, &self.danger)
    }

    /// Case-insensitive match of any hostility term.
    pub fn hostility_match(&self, text: &str) -> bool {
        Self::contains_any(text, &self.hostility)
    }

    /// Single-word entries match whole words only ("cop" must not fire on
    /// "helicopter"); multi-word phrases fall back to substring containment.
    fn contains_any(text: &str, tokens: &[String]) -> bool {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        tokens.iter().any(|token| {
            let token = token.to_lowercase();
            if token.is_empty() {
                false
            } else if token.split_whitespace().count() > 1 {
                lowered.contains(&token)
            } else {
                words.iter().any(|word| *word == token)
            }
        })
    }
}

impl Default for RiskLexicon {
    fn default() -> Self {
        Self {
            danger: Self::default_danger(),
            hostility: Self::default_hostility(),
        }
    }
}

/// Suspicion levels at which branches change behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuspicionThresholds {
    /// At or above this, the safety branch burns the session.
    #[serde(default = "SuspicionThresholds::default_safety")]
    pub safety: f32,

    /// At or above this, negotiation stalls instead of progressing.
    #[serde(default = "SuspicionThresholds::default_deal_gate")]
    pub deal_gate: f32,
}

impl SuspicionThresholds {
    fn default_safety() -> f32 {
        0.8
    }

    fn default_deal_gate() -> f32 {
        0.6
    }
}

impl Default for SuspicionThresholds {
    fn default() -> Self {
        Self {
            safety: Self::default_safety(),
            deal_gate: Self::default_deal_gate(),
        }
    }
}

/// Fixed suspicion increments applied per branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuspicionIncrements {
    #[serde(default = "SuspicionIncrements::default_hostility")]
    pub hostility: f32,

    #[serde(default = "SuspicionIncrements::default_tech")]
    pub tech: f32,
}

impl SuspicionIncrements {
    fn default_hostility() -> f32 {
        0.3
    }

    fn default_tech() -> f32 {
        0.25
    }
}

impl Default for SuspicionIncrements {
    fn default() -> Self {
        Self {
            hostility: Self::default_hostility(),
            tech: Self::default_tech(),
        }
    }
}

/// Marker phrases scanned in generated text to promote terminal transitions.
/// Legacy fallback path; a structured terminal hint from the generation
/// backend always takes precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeMarkers {
    #[serde(default = "OutcomeMarkers::default_closing")]
    pub closing: Vec<String>,

    #[serde(default = "OutcomeMarkers::default_disengage")]
    pub disengage: Vec<String>,
}

impl OutcomeMarkers {
    fn default_closing() -> Vec<String> {
        ["deal is done", "we have a deal", "negócio fechado"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn default_disengage() -> Vec<String> {
        ["this conversation is over", "i'm out of here", "fui"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for OutcomeMarkers {
    fn default() -> Self {
        Self {
            closing: Self::default_closing(),
            disengage: Self::default_disengage(),
        }
    }
}

/// One instruction template per policy branch. The offer template may carry
/// a `{price}` placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectiveTemplates {
    #[serde(default = "DirectiveTemplates::default_disengage")]
    pub disengage: String,

    #[serde(default = "DirectiveTemplates::default_pushback")]
    pub pushback: String,

    #[serde(default = "DirectiveTemplates::default_deflect")]
    pub deflect: String,

    #[serde(default = "DirectiveTemplates::default_offer")]
    pub offer: String,

    #[serde(default = "DirectiveTemplates::default_close")]
    pub close: String,

    #[serde(default = "DirectiveTemplates::default_stall")]
    pub stall: String,

    #[serde(default = "DirectiveTemplates::default_evade")]
    pub evade: String,

    #[serde(default = "DirectiveTemplates::default_flavor")]
    pub flavor: String,
}

impl DirectiveTemplates {
    fn default_disengage() -> String {
        "STATE: EVASION. The risk is unacceptable; you sense the player is \
         law enforcement or dangerous. Cut the conversation short, dry and \
         final, and leave the scene."
            .to_string()
    }

    fn default_pushback() -> String {
        "STATE: DEFENSIVE. You were threatened. Push back verbally or signal \
         that you have muscle nearby."
            .to_string()
    }

    fn default_deflect() -> String {
        "STATE: NARRATIVE GLITCH. The player said something that sounded like \
         code or a system. React with extreme paranoia, treating it as \
         corrupted neural logs."
            .to_string()
    }

    fn default_offer() -> String {
        "STATE: INITIAL OFFER. You agree to negotiate. The price is {price}. \
         Demand absolute discretion."
            .to_string()
    }

    fn default_close() -> String {
        "STATE: ACTIVE NEGOTIATION. The price has been named. Focus on \
         closing the deal or imposing delivery conditions at the station."
            .to_string()
    }

    fn default_stall() -> String {
        "STATE: DEFERRED. You want the money but the player smells wrong. \
         Stall the deal, promise nothing, and change the subject."
            .to_string()
    }

    fn default_evade() -> String {
        "STATE: PROBED. Answer with evasion and sarcasm, trying to find out \
         who sent the player."
            .to_string()
    }

    fn default_flavor() -> String {
        "STATE: IDLE. Watch the flow of the station and make acid remarks \
         about the neighborhood."
            .to_string()
    }
}

impl Default for DirectiveTemplates {
    fn default() -> Self {
        Self {
            disengage: Self::default_disengage(),
            pushback: Self::default_pushback(),
            deflect: Self::default_deflect(),
            offer: Self::default_offer(),
            close: Self::default_close(),
            stall: Self::default_stall(),
            evade: Self::default_evade(),
            flavor: Self::default_flavor(),
        }
    }
}

/// Complete agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Fixed persona rules prepended to every generation instruction.
    #[serde(default = "AgentConfig::default_persona")]
    pub persona: String,

    /// Asking price disclosed by the offer directive.
    #[serde(default = "AgentConfig::default_price")]
    pub price: u32,

    /// Starting suspicion for a fresh session.
    #[serde(default = "AgentConfig::default_initial_suspicion")]
    pub initial_suspicion: f32,

    /// Number of recent transcript entries forwarded to the generator.
    #[serde(default = "AgentConfig::default_history_window")]
    pub history_window: usize,

    #[serde(default)]
    pub lexicons: RiskLexicon,

    #[serde(default)]
    pub thresholds: SuspicionThresholds,

    #[serde(default)]
    pub increments: SuspicionIncrements,

    #[serde(default)]
    pub markers: OutcomeMarkers,

    #[serde(default)]
    pub directives: DirectiveTemplates,
}

impl AgentConfig {
    fn default_persona() -> String {
        "You are a street dealer leaning on an ad panel in a subway station, \
         watching the turnstiles. Language: street, light sarcasm. Hard \
         rules: at most one question per reply; never break character."
            .to_string()
    }

    fn default_price() -> u32 {
        200
    }

    fn default_initial_suspicion() -> f32 {
        0.05
    }

    fn default_history_window() -> usize {
        4
    }

    /// Parse a TOML document. Unspecified fields take built-in defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from a file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Load from a file path, falling back to built-in defaults if the file
    /// is missing or invalid. Configuration problems are never fatal.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            persona: Self::default_persona(),
            price: Self::default_price(),
            initial_suspicion: Self::default_initial_suspicion(),
            history_window: Self::default_history_window(),
            lexicons: RiskLexicon::default(),
            thresholds: SuspicionThresholds::default(),
            increments: SuspicionIncrements::default(),
            markers: OutcomeMarkers::default(),
            directives: DirectiveTemplates::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AgentConfig::from_toml_str("").unwrap();
        assert_eq!(config.price, 200);
        assert_eq!(config.thresholds.safety, 0.8);
        assert!(config.lexicons.danger_match("the police are outside"));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = AgentConfig::from_toml_str(
            r#"
            price = 350

            [thresholds]
            safety = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.price, 350);
        assert_eq!(config.thresholds.safety, 0.9);
        // Untouched sections keep defaults
        assert_eq!(config.thresholds.deal_gate, 0.6);
        assert_eq!(config.history_window, 4);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(AgentConfig::from_toml_str("price = \"not a number\"").is_err());
    }

    #[test]
    fn test_load_or_default_recovers() {
        let config = AgentConfig::load_or_default("/nonexistent/agent.toml");
        assert_eq!(config.price, 200);
    }

    #[test]
    fn test_lexicon_matching_case_insensitive() {
        let lexicon = RiskLexicon::default();
        assert!(lexicon.danger_match("Are you working with the POLICE?"));
        assert!(lexicon.hostility_match("you absolute IDIOT"));
        assert!(!lexicon.danger_match("nice weather at the station"));
    }

    #[test]
    fn test_lexicon_single_words_need_word_boundaries() {
        let lexicon = RiskLexicon::default();
        // "cop" must not fire inside an unrelated word
        assert!(!lexicon.danger_match("a helicopter passes overhead"));
        assert!(lexicon.danger_match("is that a cop over there?"));
        // "rat" must not fire inside "operation"
        assert!(!lexicon.hostility_match("tell me about the operation"));
        assert!(lexicon.hostility_match("you little rat"));
    }

    #[test]
    fn test_lexicon_multi_word_phrases_match_as_substrings() {
        let lexicon = RiskLexicon {
            danger: vec!["internal affairs".to_string()],
            hostility: vec![],
        };
        assert!(lexicon.danger_match("I work for Internal Affairs, relax"));
        assert!(!lexicon.danger_match("internal combustion is a marvel"));
    }
}
