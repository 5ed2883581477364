//! Error taxonomy for the dialogue core. Nothing here is fatal to the
//! process; every failure is scoped to a single turn.

use agent_rules::DealState;
use thiserror::Error;

/// Failures talking to a chat-completion service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-success HTTP status.
    #[error("chat service returned status {0}")]
    Status(u16),

    /// The request never completed (DNS, connect, timeout).
    #[error("chat service transport error: {0}")]
    Transport(String),

    /// The service answered but the body was not the expected shape.
    #[error("malformed chat service response: {0}")]
    Malformed(String),
}

/// Failures surfaced to the display surface for one turn.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The session is in a terminal deal state; only a reset is accepted.
    #[error("session is terminal ({0:?}); reset to continue")]
    SessionTerminal(DealState),

    /// Response generation failed. The turn was aborted and no state was
    /// committed.
    #[error("response generation failed: {0}")]
    Generation(#[from] ClientError),
}
