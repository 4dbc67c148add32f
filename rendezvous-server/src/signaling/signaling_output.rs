use rendezvous_core::{ConnectionId, ServerMessage};

/// Outbound side of the signaling layer. The websocket server implements it
/// so the registry and router can reach connections without knowing the
/// transport.
///
/// Delivery is fire-and-forget: implementations must not block and must not
/// wait for acknowledgement.
pub trait SignalingOutput: Send + Sync {
    /// Queue `msg` for `connection_id`. Returns `false` if the connection is
    /// unknown or already gone.
    fn deliver(&self, connection_id: &ConnectionId, msg: &ServerMessage) -> bool;

    fn is_live(&self, connection_id: &ConnectionId) -> bool;

    /// Forget the connection. Returns `false` if it was not registered.
    fn unregister(&self, connection_id: &ConnectionId) -> bool;
}
