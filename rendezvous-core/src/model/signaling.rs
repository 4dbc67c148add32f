use crate::model::connection::ConnectionId;
use crate::model::description::{IceCandidate, SessionDescription};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Entry of an `all-users` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub username: String,
}

/// Frames sent by a participant to the signaling server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    JoinRoom {
        room_id: RoomId,
        username: String,
    },
    Leave,
    Offer {
        target: ConnectionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<ConnectionId>,
        sdp: SessionDescription,
    },
    Answer {
        target: ConnectionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<ConnectionId>,
        sdp: SessionDescription,
    },
    IceCandidate {
        target: ConnectionId,
        /// Ignored by the server, which stamps the real sender.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caller: Option<ConnectionId>,
        candidate: IceCandidate,
    },
    SendMessage {
        room_id: RoomId,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<u64>,
    },
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::JoinRoom { .. } => "join-room",
            ClientMessage::Leave => "leave",
            ClientMessage::Offer { .. } => "offer",
            ClientMessage::Answer { .. } => "answer",
            ClientMessage::IceCandidate { .. } => "ice-candidate",
            ClientMessage::SendMessage { .. } => "send-message",
        }
    }
}

/// Frames sent by the signaling server to a participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    AllUsers {
        users: Vec<Participant>,
    },
    UserConnected {
        connection_id: ConnectionId,
        username: String,
    },
    UserDisconnected {
        connection_id: ConnectionId,
    },
    RoomClosed,
    Offer {
        caller: ConnectionId,
        target: ConnectionId,
        sdp: SessionDescription,
    },
    Answer {
        caller: ConnectionId,
        target: ConnectionId,
        sdp: SessionDescription,
    },
    IceCandidate {
        caller: ConnectionId,
        target: ConnectionId,
        candidate: IceCandidate,
    },
    ReceiveMessage {
        room_id: RoomId,
        message: String,
        sender: String,
        timestamp: u64,
    },
    Error {
        reason: String,
    },
}
