use rendezvous_core::{ConnectionId, Participant};
use std::collections::HashMap;

/// Membership of one room. The creator is the host; the room must not outlive
/// the host's membership.
#[derive(Debug, Clone)]
pub struct Room {
    host: ConnectionId,
    members: HashMap<ConnectionId, String>,
}

impl Room {
    pub fn new(host: ConnectionId) -> Self {
        Self {
            host,
            members: HashMap::new(),
        }
    }

    pub fn host(&self) -> &ConnectionId {
        &self.host
    }

    pub fn members(&self) -> &HashMap<ConnectionId, String> {
        &self.members
    }

    pub fn member_ids(&self) -> impl Iterator<Item = &ConnectionId> {
        self.members.keys()
    }

    pub fn display_name(&self, connection_id: &ConnectionId) -> Option<&str> {
        self.members.get(connection_id).map(String::as_str)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains_key(connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Host still present among the members.
    pub fn is_consistent(&self) -> bool {
        self.members.contains_key(&self.host)
    }

    pub(crate) fn insert(&mut self, connection_id: ConnectionId, username: String) {
        self.members.insert(connection_id, username);
    }

    pub(crate) fn remove(&mut self, connection_id: &ConnectionId) -> Option<String> {
        self.members.remove(connection_id)
    }

    /// Everyone except `connection_id`, as sent in `all-users`.
    pub fn participants_except(&self, connection_id: &ConnectionId) -> Vec<Participant> {
        self.members
            .iter()
            .filter(|(id, _)| *id != connection_id)
            .map(|(id, name)| Participant {
                connection_id: id.clone(),
                username: name.clone(),
            })
            .collect()
    }
}
