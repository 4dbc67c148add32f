use crate::error::NegotiationError;
use crate::transport::RemoteTrack;
use rendezvous_core::{ConnectionId, Participant, RoomId};

/// What the engine reports to the application.
#[derive(Debug, Clone)]
pub enum PeerEvent {
    /// Media path to `peer` is up.
    PeerConnected { peer: ConnectionId },
    /// Session with `peer` torn down, for whatever reason.
    PeerDisconnected { peer: ConnectionId },
    RemoteTrack {
        peer: ConnectionId,
        track: RemoteTrack,
    },
    /// The session was abandoned. A new one starts only with a fresh offer.
    NegotiationFailed {
        peer: ConnectionId,
        error: NegotiationError,
    },
    ChatMessage {
        room_id: RoomId,
        sender: String,
        message: String,
        timestamp: u64,
    },
    RoomClosed,
    /// Members already present when this connection joined.
    Roster { users: Vec<Participant> },
    ServerError { reason: String },
}
