mod connection;
mod description;
mod room;
mod signaling;

pub use connection::{ConnectionId, ConnectionIdError};
pub use description::{IceCandidate, SdpType, SessionDescription};
pub use room::RoomId;
pub use signaling::{ClientMessage, IceServerConfig, Participant, ServerMessage};
