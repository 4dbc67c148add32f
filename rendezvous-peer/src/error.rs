use crate::session::NegotiationState;
use rendezvous_core::{ConnectionId, SdpType};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NegotiationError {
    #[error("failed to generate local {kind:?}: {reason}")]
    Description { kind: SdpType, reason: String },

    #[error("failed to apply remote description: {0}")]
    RemoteDescription(String),

    #[error("failed to apply ICE candidate: {0}")]
    Candidate(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("session with {0} is closed")]
    Closed(ConnectionId),

    #[error("unexpected {signal} in state {state}")]
    UnexpectedSignal {
        signal: &'static str,
        state: NegotiationState,
    },
}

impl NegotiationError {
    /// Fatal errors abandon the session; the rest only drop the offending signal.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NegotiationError::Description { .. }
                | NegotiationError::RemoteDescription(_)
                | NegotiationError::Transport(_)
        )
    }
}
