use crate::model::ConnectionId;

/// Implemented by anything holding per-connection negotiation state that must
/// be torn down when a connection goes away.
pub trait DisconnectListener: Send + Sync {
    fn on_disconnect(&self, connection_id: &ConnectionId);
}
