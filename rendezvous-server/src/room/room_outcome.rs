use rendezvous_core::{Participant, RoomId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room_id: RoomId,
    pub is_new_room: bool,
    /// Members present before the join, excluding the joiner.
    pub prior_members: Vec<Participant>,
    /// Set when joining forced the connection out of another room first.
    pub left: Option<LeaveOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub room_id: RoomId,
    pub username: String,
    pub was_host: bool,
    pub became_empty: bool,
    pub room_deleted: bool,
    /// How many remaining members were notified.
    pub notified: usize,
}
