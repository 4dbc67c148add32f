use crate::error::RegistryError;
use crate::room::RoomRegistry;
use crate::signaling::SignalingOutput;
use rendezvous_core::{ClientMessage, ConnectionId, ServerMessage, now_millis};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Number of connections that received something as a result.
    Delivered(usize),
    /// Target gone or sender no longer live. Never reported back to the sender.
    Dropped,
    Rejected(RegistryError),
}

/// Dispatches inbound client frames: membership kinds go to the
/// [`RoomRegistry`], negotiation kinds straight to their target.
#[derive(Clone)]
pub struct SignalingRouter {
    registry: RoomRegistry,
    signaling: Arc<dyn SignalingOutput>,
}

impl SignalingRouter {
    pub fn new(registry: RoomRegistry, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry,
            signaling,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn route(&self, from: &ConnectionId, msg: ClientMessage) -> RouteOutcome {
        if !self.signaling.is_live(from) {
            debug!("Ignoring {} from dead connection {}", msg.kind(), from);
            return RouteOutcome::Dropped;
        }

        match msg {
            ClientMessage::JoinRoom { room_id, username } => {
                match self.registry.join(from, room_id, username) {
                    Ok(outcome) => {
                        let all_users = ServerMessage::AllUsers {
                            users: outcome.prior_members.clone(),
                        };
                        let answered = usize::from(self.signaling.deliver(from, &all_users));
                        RouteOutcome::Delivered(outcome.prior_members.len() + answered)
                    }
                    Err(e) => {
                        warn!("Rejected join from {}: {}", from, e);
                        self.signaling.deliver(
                            from,
                            &ServerMessage::Error {
                                reason: e.to_string(),
                            },
                        );
                        RouteOutcome::Rejected(e)
                    }
                }
            }

            ClientMessage::Leave => match self.registry.leave(from) {
                Some(outcome) => RouteOutcome::Delivered(outcome.notified),
                None => RouteOutcome::Dropped,
            },

            ClientMessage::Offer { target, caller, sdp } => {
                let caller = caller.unwrap_or_else(|| from.clone());
                self.forward(&target, ServerMessage::Offer { caller, target: target.clone(), sdp })
            }

            ClientMessage::Answer { target, caller, sdp } => {
                let caller = caller.unwrap_or_else(|| from.clone());
                self.forward(&target, ServerMessage::Answer { caller, target: target.clone(), sdp })
            }

            ClientMessage::IceCandidate {
                target, candidate, ..
            } => self.forward(
                &target,
                ServerMessage::IceCandidate {
                    caller: from.clone(),
                    target: target.clone(),
                    candidate,
                },
            ),

            ClientMessage::SendMessage {
                room_id,
                message,
                timestamp,
            } => {
                let timestamp = timestamp.unwrap_or_else(now_millis);
                let reached = self.registry.broadcast_from(from, &room_id, |sender| {
                    info!("Chat in {} from {}", room_id, sender);
                    ServerMessage::ReceiveMessage {
                        room_id: room_id.clone(),
                        message,
                        sender: sender.to_owned(),
                        timestamp,
                    }
                });
                RouteOutcome::Delivered(reached)
            }
        }
    }

    fn forward(&self, target: &ConnectionId, msg: ServerMessage) -> RouteOutcome {
        if self.signaling.deliver(target, &msg) {
            debug!("Forwarded signal to {}", target);
            RouteOutcome::Delivered(1)
        } else {
            debug!("Target {} is gone; signal dropped", target);
            RouteOutcome::Dropped
        }
    }
}
