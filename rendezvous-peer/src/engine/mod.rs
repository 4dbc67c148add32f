use crate::session::{NegotiationState, SignalSink};
use crate::transport::{TransportConfig, TransportFactory};
use dashmap::DashMap;
use rendezvous_core::{ConnectionId, IceCandidate, RoomId};
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{mpsc, watch};

mod handle_signal_impl;
mod peer_event;
mod room_actions_impl;
mod session_actor_impl;
mod teardown_impl;

pub use peer_event::PeerEvent;

use session_actor_impl::SessionHandle;

struct ManagerInner {
    local_id: RwLock<Option<ConnectionId>>,
    room: RwLock<Option<RoomId>>,
    transport_config: RwLock<TransportConfig>,
    sessions: DashMap<ConnectionId, SessionHandle>,
    /// Candidates from room peers that have no session yet, in receipt order.
    parked_candidates: DashMap<ConnectionId, Vec<IceCandidate>>,
    next_generation: AtomicU64,
    signals: Arc<dyn SignalSink>,
    events: mpsc::UnboundedSender<PeerEvent>,
    transports: Arc<dyn TransportFactory>,
}

/// Client-side negotiation engine: one [`PeerSession`](crate::PeerSession)
/// actor per remote connection in the current room.
///
/// Feed it every frame from the signaling server through
/// [`handle_server_message`](Self::handle_server_message); everything it has
/// to say goes out through the [`SignalSink`] and the [`PeerEvent`] channel.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<ManagerInner>,
}

impl SessionManager {
    pub fn new(
        signals: Arc<dyn SignalSink>,
        transports: Arc<dyn TransportFactory>,
        config: TransportConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PeerEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();

        let manager = Self {
            inner: Arc::new(ManagerInner {
                local_id: RwLock::new(None),
                room: RwLock::new(None),
                transport_config: RwLock::new(config),
                sessions: DashMap::new(),
                parked_candidates: DashMap::new(),
                next_generation: AtomicU64::new(0),
                signals,
                events,
                transports,
            }),
        };

        (manager, events_rx)
    }

    /// Known once the server's `welcome` frame has been handled.
    pub fn local_id(&self) -> Option<ConnectionId> {
        read(&self.inner.local_id).clone()
    }

    pub fn room(&self) -> Option<RoomId> {
        read(&self.inner.room).clone()
    }

    pub fn peers(&self) -> Vec<ConnectionId> {
        self.inner
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }

    /// Candidates held for `remote` until its offer arrives.
    pub fn parked_candidates(&self, remote: &ConnectionId) -> usize {
        self.inner
            .parked_candidates
            .get(remote)
            .map_or(0, |parked| parked.len())
    }

    pub fn session_state(&self, remote: &ConnectionId) -> Option<NegotiationState> {
        self.inner
            .sessions
            .get(remote)
            .map(|handle| *handle.state.borrow())
    }

    /// Resolves once the session with `remote` reaches `wanted` or closes.
    /// `None` when there is no such session.
    pub async fn wait_for_state(
        &self,
        remote: &ConnectionId,
        wanted: NegotiationState,
    ) -> Option<NegotiationState> {
        let mut state = self.watch_state(remote)?;
        let reached = state
            .wait_for(|s| *s == wanted || s.is_closed())
            .await
            .map(|s| *s);
        Some(reached.unwrap_or(NegotiationState::Closed))
    }

    fn watch_state(&self, remote: &ConnectionId) -> Option<watch::Receiver<NegotiationState>> {
        self.inner
            .sessions
            .get(remote)
            .map(|handle| handle.state.clone())
    }

    fn emit(&self, event: PeerEvent) {
        let _ = self.inner.events.send(event);
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
