use thiserror::Error;

/// A signaling frame the engine could not make sense of.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// How a user-facing notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Shown briefly and dismissed on its own.
    Transient,
    /// Stays until the user dismisses it.
    Persistent,
}

/// Failure taxonomy of the room engine. Nothing here is retried
/// automatically; recovery is a manual user action.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Socket closed or errored, before or after the room was joined.
    #[error("connection lost: {0}")]
    Transport(String),
    /// The server sent something the protocol does not allow at this point.
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// A peer connection gave up; cleaned up silently.
    #[error("negotiation failed: {0}")]
    Negotiation(String),
    /// The browser cannot capture the display, or the user declined.
    #[error("{0}")]
    Capability(String),
}

impl EngineError {
    pub fn severity(&self) -> Severity {
        match self {
            EngineError::Transport(_) | EngineError::Capability(_) => Severity::Persistent,
            EngineError::Protocol(_) | EngineError::Negotiation(_) => Severity::Transient,
        }
    }
}
