use crate::engine::{SessionManager, write};
use rendezvous_core::{ClientMessage, RoomId, now_millis};
use tracing::{debug, info};

impl SessionManager {
    /// Asks the server to put this connection in `room_id`. Sessions from a
    /// previous room are closed first.
    pub fn join(&self, room_id: impl Into<RoomId>, username: impl Into<String>) -> bool {
        let room_id = room_id.into();
        self.close_all();
        *write(&self.inner.room) = Some(room_id.clone());

        info!("Joining room {}", room_id);
        self.inner.signals.send(ClientMessage::JoinRoom {
            room_id,
            username: username.into(),
        })
    }

    /// Closes every session and tells the server this connection left.
    pub fn leave(&self) -> bool {
        let closed = self.close_all();
        *write(&self.inner.room) = None;

        info!("Leaving room ({} sessions closed)", closed);
        self.inner.signals.send(ClientMessage::Leave)
    }

    /// Chat to the current room. `false` when not in a room.
    pub fn send_chat(&self, message: impl Into<String>) -> bool {
        let Some(room_id) = self.room() else {
            debug!("Not in a room; chat dropped");
            return false;
        };

        self.inner.signals.send(ClientMessage::SendMessage {
            room_id,
            message: message.into(),
            timestamp: Some(now_millis()),
        })
    }
}
