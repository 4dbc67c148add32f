use rendezvous_core::ClientMessage;
use tokio::sync::mpsc;

/// Outbound half of the signaling connection.
pub trait SignalSink: Send + Sync {
    /// Fire-and-forget; `false` when the connection is gone.
    fn send(&self, msg: ClientMessage) -> bool;
}

impl SignalSink for mpsc::UnboundedSender<ClientMessage> {
    fn send(&self, msg: ClientMessage) -> bool {
        mpsc::UnboundedSender::send(self, msg).is_ok()
    }
}
