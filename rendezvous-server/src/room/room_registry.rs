use crate::error::RegistryError;
use crate::room::{JoinOutcome, LeaveOutcome, Room};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rendezvous_core::{ANONYMOUS_SENDER, ConnectionId, Participant, RoomId, ServerMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct RegistryInner {
    rooms: DashMap<RoomId, Room>,
    /// Which room a connection last joined. `Room::members` is authoritative;
    /// an entry pointing at a closed or re-created room is simply stale.
    memberships: DashMap<ConnectionId, RoomId>,
    signaling: Arc<dyn SignalingOutput>,
}

/// Process-wide room state.
///
/// Lock order is membership entry first, room entry second. Every operation
/// is synchronous so no map guard is ever held across an await point, and
/// membership events are delivered while the room entry is held, which keeps
/// them ordered per room.
#[derive(Clone)]
pub struct RoomRegistry {
    inner: Arc<RegistryInner>,
}

impl RoomRegistry {
    pub fn new(signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                rooms: DashMap::new(),
                memberships: DashMap::new(),
                signaling,
            }),
        }
    }

    pub fn join(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        username: String,
    ) -> Result<JoinOutcome, RegistryError> {
        if room_id.is_blank() {
            return Err(RegistryError::MalformedJoin { field: "roomId" });
        }
        if username.trim().is_empty() {
            return Err(RegistryError::MalformedJoin { field: "username" });
        }

        let membership = self.inner.memberships.entry(connection_id.clone());

        let left = match &membership {
            Entry::Occupied(prior) => self.leave_room(connection_id, prior.get()),
            Entry::Vacant(_) => None,
        };

        let (is_new_room, prior_members) = self.enter_room(connection_id, &room_id, username);

        match membership {
            Entry::Occupied(mut prior) => {
                prior.insert(room_id.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(room_id.clone());
            }
        }

        Ok(JoinOutcome {
            room_id,
            is_new_room,
            prior_members,
            left,
        })
    }

    /// Removes the connection from whatever room it is in. `None` when it was
    /// not in any room.
    pub fn leave(&self, connection_id: &ConnectionId) -> Option<LeaveOutcome> {
        let Entry::Occupied(membership) = self.inner.memberships.entry(connection_id.clone())
        else {
            debug!("{} is not in any room", connection_id);
            return None;
        };

        let outcome = self.leave_room(connection_id, membership.get());
        membership.remove();
        outcome
    }

    pub fn snapshot(&self, room_id: &RoomId) -> Option<HashMap<ConnectionId, String>> {
        self.inner
            .rooms
            .get(room_id)
            .map(|room| room.members().clone())
    }

    pub fn host_of(&self, room_id: &RoomId) -> Option<ConnectionId> {
        self.inner.rooms.get(room_id).map(|room| room.host().clone())
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let room_id = self.inner.memberships.get(connection_id)?.value().clone();
        let in_room = self
            .inner
            .rooms
            .get(&room_id)
            .is_some_and(|room| room.contains(connection_id));
        in_room.then_some(room_id)
    }

    pub fn display_name(&self, room_id: &RoomId, connection_id: &ConnectionId) -> Option<String> {
        let room = self.inner.rooms.get(room_id)?;
        room.display_name(connection_id).map(str::to_owned)
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.inner.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.inner.rooms.len()
    }

    /// Sends a message built from the sender's display name to every other
    /// member of `room_id`. A sender outside the room is named
    /// [`ANONYMOUS_SENDER`].
    pub fn broadcast_from(
        &self,
        from: &ConnectionId,
        room_id: &RoomId,
        build: impl FnOnce(&str) -> ServerMessage,
    ) -> usize {
        let Some(room) = self.inner.rooms.get(room_id) else {
            debug!("Broadcast to missing room {} dropped", room_id);
            return 0;
        };

        let sender = room.display_name(from).unwrap_or(ANONYMOUS_SENDER);
        let msg = build(sender);

        room.member_ids()
            .filter(|id| *id != from)
            .filter(|id| self.deliver(id, &msg))
            .count()
    }

    fn enter_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        username: String,
    ) -> (bool, Vec<Participant>) {
        let mut is_new_room = false;
        let mut room = self
            .inner
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                is_new_room = true;
                Room::new(connection_id.clone())
            });

        if !is_new_room && !room.is_consistent() {
            warn!(
                "Room {} lost its host {}; closing it before join",
                room_id,
                room.host()
            );
            let stranded: Vec<ConnectionId> = room.member_ids().cloned().collect();
            self.notify(&stranded, &ServerMessage::RoomClosed);
            *room = Room::new(connection_id.clone());
            is_new_room = true;
        }

        if is_new_room {
            info!("Room created: {}, host {} ({})", room_id, username, connection_id);
        }

        let prior_members = room.participants_except(connection_id);

        let joined = ServerMessage::UserConnected {
            connection_id: connection_id.clone(),
            username: username.clone(),
        };
        for member in &prior_members {
            self.deliver(&member.connection_id, &joined);
        }

        info!("{} ({}) joined room {}", username, connection_id, room_id);
        room.insert(connection_id.clone(), username);
        debug!("Room {} now has {} members", room_id, room.len());

        (is_new_room, prior_members)
    }

    fn leave_room(&self, connection_id: &ConnectionId, room_id: &RoomId) -> Option<LeaveOutcome> {
        let Entry::Occupied(mut occupied) = self.inner.rooms.entry(room_id.clone()) else {
            return None;
        };

        let username = occupied.get_mut().remove(connection_id)?;
        info!("{} ({}) left room {}", username, connection_id, room_id);

        let room = occupied.get();
        let remaining: Vec<ConnectionId> = room.member_ids().cloned().collect();
        let was_host = room.host() == connection_id;
        let became_empty = remaining.is_empty();
        let host_missing = !was_host && !became_empty && !room.is_consistent();

        self.notify(
            &remaining,
            &ServerMessage::UserDisconnected {
                connection_id: connection_id.clone(),
            },
        );

        let room_deleted = if was_host {
            info!("Host left room {}; closing it", room_id);
            self.notify(&remaining, &ServerMessage::RoomClosed);
            true
        } else if became_empty {
            info!("Room {} is empty; deleting it", room_id);
            true
        } else if host_missing {
            warn!("Room {} has no host among its members; closing it", room_id);
            self.notify(&remaining, &ServerMessage::RoomClosed);
            true
        } else {
            false
        };

        if room_deleted {
            occupied.remove();
        }

        Some(LeaveOutcome {
            room_id: room_id.clone(),
            username,
            was_host,
            became_empty,
            room_deleted,
            notified: remaining.len(),
        })
    }

    fn notify(&self, targets: &[ConnectionId], msg: &ServerMessage) -> usize {
        targets.iter().filter(|id| self.deliver(id, msg)).count()
    }

    fn deliver(&self, connection_id: &ConnectionId, msg: &ServerMessage) -> bool {
        let delivered = self.inner.signaling.deliver(connection_id, msg);
        if !delivered {
            debug!("Connection {} is gone; notification dropped", connection_id);
        }
        delivered
    }
}
