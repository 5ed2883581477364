//! # Dialogue Core
//!
//! The "brain" of the NPC dialogue agent. This crate interfaces with
//! `agent_rules`, classifies player utterances, conditions a language-model
//! generator on the behavior policy's directive, and orchestrates the turn
//! lifecycle.
//!
//! ## Core Components
//!
//! - **client**: chat-service abstraction plus an OpenAI-compatible backend
//! - **sensor**: two-tier intent classification (lexicon screen + semantic)
//! - **generator**: persona/directive/state prompt assembly
//! - **orchestrator**: per-session turn loop with commit-on-success state
//!
//! ## Design Philosophy
//!
//! - **Safety first**: the deterministic lexicon tier resolves dangerous
//!   inputs before any model call can misread them
//! - **No partial turns**: state mutations are staged and committed only
//!   after generation succeeds
//! - **Terminal states are final**: a closed or burned session only accepts
//!   a reset

pub mod client;
pub mod error;
pub mod generator;
pub mod orchestrator;
pub mod sensor;

pub use client::*;
pub use error::*;
pub use generator::*;
pub use orchestrator::*;
pub use sensor::*;
