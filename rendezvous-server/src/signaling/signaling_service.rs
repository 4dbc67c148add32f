use crate::signaling::SignalingOutput;
use axum::extract::ws::Message;
use dashmap::DashMap;
use rendezvous_core::{ConnectionId, IceServerConfig, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Websocket-backed [`SignalingOutput`]: one unbounded sender per live
/// connection, drained by that connection's write task.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn register(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.connections.insert(connection_id, tx);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn send_signal(&self, connection_id: &ConnectionId, msg: &ServerMessage) -> bool {
        let Some(connection) = self.inner.connections.get(connection_id) else {
            debug!("Dropping signal for unknown connection {}", connection_id);
            return false;
        };

        match serde_json::to_string(msg) {
            Ok(json) => match connection.send(Message::Text(json.into())) {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to send WS message to {}: {:?}", connection_id, e);
                    false
                }
            },
            Err(e) => {
                error!("Failed to serialize signal message: {}", e);
                false
            }
        }
    }
}

impl SignalingOutput for SignalingService {
    fn deliver(&self, connection_id: &ConnectionId, msg: &ServerMessage) -> bool {
        self.send_signal(connection_id, msg)
    }

    fn is_live(&self, connection_id: &ConnectionId) -> bool {
        self.inner.connections.contains_key(connection_id)
    }

    fn unregister(&self, connection_id: &ConnectionId) -> bool {
        self.inner.connections.remove(connection_id).is_some()
    }
}
