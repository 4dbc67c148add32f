use crate::room::{LeaveOutcome, RoomRegistry};
use crate::signaling::SignalingOutput;
use rendezvous_core::{ConnectionId, DisconnectListener};
use std::sync::Arc;
use tracing::info;

/// Cleans up after a lost connection: registry membership first, then any
/// negotiation state registered through [`DisconnectListener`], then the
/// connection itself so nothing more is routed to or from it.
#[derive(Clone)]
pub struct DisconnectReconciler {
    registry: RoomRegistry,
    signaling: Arc<dyn SignalingOutput>,
    listeners: Vec<Arc<dyn DisconnectListener>>,
}

impl DisconnectReconciler {
    pub fn new(registry: RoomRegistry, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry,
            signaling,
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn DisconnectListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Every step is idempotent, so a repeated call for the same connection
    /// only reports `was_live: false`.
    pub fn on_disconnect(&self, connection_id: &ConnectionId) -> Reconciled {
        let was_live = self.signaling.is_live(connection_id);

        let left = self.registry.leave(connection_id);
        if let Some(outcome) = &left {
            info!(
                "{} disconnected from room {} (host: {}, room deleted: {})",
                connection_id, outcome.room_id, outcome.was_host, outcome.room_deleted
            );
        }

        for listener in &self.listeners {
            listener.on_disconnect(connection_id);
        }

        self.signaling.unregister(connection_id);

        Reconciled { was_live, left }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub was_live: bool,
    pub left: Option<LeaveOutcome>,
}
