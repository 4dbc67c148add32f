use crate::engine::{PeerEvent, SessionManager};
use rendezvous_core::{ConnectionId, DisconnectListener};
use tracing::debug;

impl SessionManager {
    /// Tears down the session with `remote`, discarding its queued and
    /// parked candidates. `false` when there was none.
    pub fn close_session(&self, remote: &ConnectionId) -> bool {
        self.inner.parked_candidates.remove(remote);
        let Some((_, handle)) = self.inner.sessions.remove(remote) else {
            return false;
        };

        debug!("Closing session with {}", remote);
        handle.shutdown();
        self.emit(PeerEvent::PeerDisconnected {
            peer: remote.clone(),
        });
        true
    }

    pub fn close_all(&self) -> usize {
        self.inner.parked_candidates.clear();
        self.peers()
            .iter()
            .filter(|remote| self.close_session(remote))
            .count()
    }
}

impl DisconnectListener for SessionManager {
    fn on_disconnect(&self, connection_id: &ConnectionId) {
        self.close_session(connection_id);
    }
}
