//! # Agent Rules
//!
//! The "rule book" crate - contains the NPC's blackboard state, intent tags,
//! behavior policy, and configuration. This crate is the single source of
//! truth for agent state and does not contain any AI or network logic.

pub mod config;
pub mod intent;
pub mod policy;
pub mod session;

pub use config::*;
pub use intent::*;
pub use policy::*;
pub use session::*;
