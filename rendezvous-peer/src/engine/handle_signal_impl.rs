use crate::engine::session_actor_impl::SessionCommand;
use crate::engine::{PeerEvent, SessionManager, read, write};
use rendezvous_core::{ConnectionId, IceCandidate, ServerMessage};
use tracing::{debug, info, warn};

impl SessionManager {
    /// Applies one frame received from the signaling server. Never blocks:
    /// negotiation work is queued on the per-peer actors.
    pub fn handle_server_message(&self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { connection_id } => {
                info!("Signaling server assigned id {}", connection_id);
                *write(&self.inner.local_id) = Some(connection_id);
            }

            ServerMessage::IceConfig { ice_servers } => {
                info!("Received ICE config: {} servers", ice_servers.len());
                write(&self.inner.transport_config).ice_servers = ice_servers;
            }

            ServerMessage::AllUsers { users } => {
                // Existing members offer to the newcomer, not the other way round.
                info!("Joined room with {} peers already present", users.len());
                self.emit(PeerEvent::Roster { users });
            }

            ServerMessage::UserConnected {
                connection_id,
                username,
            } => {
                info!("{} ({}) joined; sending offer", username, connection_id);
                self.dispatch(&connection_id, SessionCommand::StartOffer);
                self.release_parked(&connection_id);
            }

            ServerMessage::UserDisconnected { connection_id } => {
                info!("{} left the room", connection_id);
                self.close_session(&connection_id);
            }

            ServerMessage::RoomClosed => {
                info!("Room closed by its host");
                self.close_all();
                *write(&self.inner.room) = None;
                self.emit(PeerEvent::RoomClosed);
            }

            ServerMessage::Offer {
                caller,
                target,
                sdp,
            } => {
                if self.addressed_to_me(&target) {
                    debug!("Received offer from {}", caller);
                    self.dispatch(&caller, SessionCommand::RemoteOffer(sdp));
                    self.release_parked(&caller);
                }
            }

            ServerMessage::Answer {
                caller,
                target,
                sdp,
            } => {
                if self.addressed_to_me(&target) {
                    debug!("Received answer from {}", caller);
                    self.dispatch_existing(&caller, SessionCommand::RemoteAnswer(sdp));
                }
            }

            ServerMessage::IceCandidate {
                caller,
                target,
                candidate,
            } => {
                if self.addressed_to_me(&target) {
                    self.route_candidate(caller, candidate);
                }
            }

            ServerMessage::ReceiveMessage {
                room_id,
                message,
                sender,
                timestamp,
            } => {
                self.emit(PeerEvent::ChatMessage {
                    room_id,
                    sender,
                    message,
                    timestamp,
                });
            }

            ServerMessage::Error { reason } => {
                warn!("Signaling server error: {}", reason);
                self.emit(PeerEvent::ServerError { reason });
            }
        }
    }

    /// Candidates never start a session. One that beats the offer is parked
    /// until the offer arrives; outside a room it is stale and dropped.
    fn route_candidate(&self, caller: ConnectionId, candidate: IceCandidate) {
        if self.inner.sessions.contains_key(&caller) {
            self.dispatch_existing(&caller, SessionCommand::RemoteCandidate(candidate));
            return;
        }

        if self.room().is_none() {
            debug!("Not in a room; stale candidate from {} dropped", caller);
            return;
        }

        debug!("Parking early candidate from {}", caller);
        self.inner
            .parked_candidates
            .entry(caller)
            .or_default()
            .push(candidate);
    }

    /// Hands parked candidates to the session just started for `remote`.
    fn release_parked(&self, remote: &ConnectionId) {
        let Some((_, parked)) = self.inner.parked_candidates.remove(remote) else {
            return;
        };

        debug!("Releasing {} parked candidates for {}", parked.len(), remote);
        for candidate in parked {
            self.dispatch_existing(remote, SessionCommand::RemoteCandidate(candidate));
        }
    }

    fn addressed_to_me(&self, target: &ConnectionId) -> bool {
        let mine = match read(&self.inner.local_id).as_ref() {
            Some(local) => local == target,
            None => true,
        };
        if !mine {
            debug!("Signal for {} is not ours; ignored", target);
        }
        mine
    }
}
