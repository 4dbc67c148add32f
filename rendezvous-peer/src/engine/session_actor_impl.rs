use crate::engine::{ManagerInner, PeerEvent, SessionManager, read};
use crate::error::NegotiationError;
use crate::session::{NegotiationState, PeerSession, SignalSink};
use crate::transport::{TransportConfig, TransportEvent, TransportEvents, TransportFactory};
use dashmap::mapref::entry::Entry;
use rendezvous_core::{ConnectionId, IceCandidate, SessionDescription};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

/// Work for one session, processed strictly in arrival order.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    StartOffer,
    RemoteOffer(SessionDescription),
    RemoteAnswer(SessionDescription),
    RemoteCandidate(IceCandidate),
}

/// The manager's grip on a running session actor. Dropping it also stops
/// the actor.
pub(super) struct SessionHandle {
    generation: u64,
    commands: mpsc::UnboundedSender<SessionCommand>,
    shutdown: Option<oneshot::Sender<()>>,
    pub(super) state: watch::Receiver<NegotiationState>,
}

impl SessionHandle {
    pub(super) fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

enum Input {
    Command(SessionCommand),
    Transport(TransportEvent),
}

struct SessionActor {
    remote: ConnectionId,
    local: Option<ConnectionId>,
    generation: u64,
    config: TransportConfig,
    transports: Arc<dyn TransportFactory>,
    signals: Arc<dyn SignalSink>,
    events: mpsc::UnboundedSender<PeerEvent>,
    manager: Weak<ManagerInner>,
}

impl SessionManager {
    /// Queues `cmd` for the session with `remote`, starting one if needed.
    pub(super) fn dispatch(&self, remote: &ConnectionId, cmd: SessionCommand) {
        let sent = match self.inner.sessions.entry(remote.clone()) {
            Entry::Occupied(entry) => entry.get().commands.send(cmd).is_ok(),
            Entry::Vacant(slot) => {
                let handle = self.spawn_session(remote.clone());
                let sent = handle.commands.send(cmd).is_ok();
                slot.insert(handle);
                sent
            }
        };

        if !sent {
            debug!("Session with {} already stopped; signal dropped", remote);
        }
    }

    /// Like [`dispatch`](Self::dispatch) but never starts a session.
    pub(super) fn dispatch_existing(&self, remote: &ConnectionId, cmd: SessionCommand) -> bool {
        let Some(handle) = self.inner.sessions.get(remote) else {
            debug!("No session with {}; {:?} dropped", remote, cmd);
            return false;
        };
        handle.commands.send(cmd).is_ok()
    }

    fn spawn_session(&self, remote: ConnectionId) -> SessionHandle {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(NegotiationState::Idle);

        debug!("Starting session with {} (generation {})", remote, generation);

        let actor = SessionActor {
            remote,
            local: self.local_id(),
            generation,
            config: read(&self.inner.transport_config).clone(),
            transports: self.inner.transports.clone(),
            signals: self.inner.signals.clone(),
            events: self.inner.events.clone(),
            manager: Arc::downgrade(&self.inner),
        };
        tokio::spawn(actor.run(commands_rx, shutdown_rx, state_tx));

        SessionHandle {
            generation,
            commands: commands_tx,
            shutdown: Some(shutdown_tx),
            state: state_rx,
        }
    }
}

impl SessionActor {
    async fn run(
        self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        mut shutdown: oneshot::Receiver<()>,
        state: watch::Sender<NegotiationState>,
    ) {
        let (transport_events, mut transport_rx) = TransportEvents::channel();

        let created = tokio::select! {
            biased;
            _ = &mut shutdown => {
                state.send_replace(NegotiationState::Closed);
                return;
            }
            created = self.transports.create(&self.remote, self.config.clone(), transport_events) => created,
        };

        let transport = match created {
            Ok(transport) => transport,
            Err(e) => {
                self.abandon(e);
                state.send_replace(NegotiationState::Closed);
                return;
            }
        };

        let mut session = PeerSession::new(
            self.remote.clone(),
            self.local.clone(),
            transport,
            self.signals.clone(),
        );
        let mut transport_live = true;
        let mut stopped = false;

        loop {
            let input = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    stopped = true;
                    break;
                }
                cmd = commands.recv() => match cmd {
                    Some(cmd) => Input::Command(cmd),
                    None => {
                        stopped = true;
                        break;
                    }
                },
                event = transport_rx.recv(), if transport_live => match event {
                    Some(event) => Input::Transport(event),
                    None => {
                        transport_live = false;
                        continue;
                    }
                },
            };

            // Shutdown abandons whatever description work is in flight.
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    stopped = true;
                    break;
                }
                _ = self.apply(&mut session, input) => {}
            }

            state.send_replace(session.state());
            if session.state().is_closed() {
                break;
            }
        }

        session.close().await;
        state.send_replace(NegotiationState::Closed);

        if !stopped {
            self.deregister();
        }
        debug!("Session actor for {} finished", self.remote);
    }

    async fn apply(&self, session: &mut PeerSession, input: Input) {
        let result = match input {
            Input::Command(SessionCommand::StartOffer) => session.start_offer().await,
            Input::Command(SessionCommand::RemoteOffer(offer)) => session.handle_offer(offer).await,
            Input::Command(SessionCommand::RemoteAnswer(answer)) => {
                session.handle_answer(answer).await
            }
            Input::Command(SessionCommand::RemoteCandidate(candidate)) => {
                session.handle_candidate(candidate).await
            }
            Input::Transport(TransportEvent::LocalCandidate(candidate)) => {
                session.local_candidate(candidate);
                Ok(())
            }
            Input::Transport(TransportEvent::Connected) => {
                if session.mark_connected() {
                    info!("Connected to {}", self.remote);
                    self.emit(PeerEvent::PeerConnected {
                        peer: self.remote.clone(),
                    });
                }
                Ok(())
            }
            Input::Transport(TransportEvent::RemoteTrack(track)) => {
                self.emit(PeerEvent::RemoteTrack {
                    peer: self.remote.clone(),
                    track,
                });
                Ok(())
            }
            Input::Transport(TransportEvent::Failed(reason)) => {
                session.close().await;
                Err(NegotiationError::Transport(reason))
            }
        };

        match result {
            Ok(()) => {}
            Err(e) if e.is_fatal() => self.abandon(e),
            Err(NegotiationError::Candidate(reason)) => {
                warn!("Candidate from {} rejected: {}", self.remote, reason);
            }
            Err(e) => debug!("Ignoring signal for {}: {}", self.remote, e),
        }
    }

    fn abandon(&self, error: NegotiationError) {
        warn!("Abandoning session with {}: {}", self.remote, error);
        self.emit(PeerEvent::NegotiationFailed {
            peer: self.remote.clone(),
            error,
        });
    }

    /// Drops the manager's handle unless it already belongs to a newer session.
    fn deregister(&self) {
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        manager
            .sessions
            .remove_if(&self.remote, |_, handle| handle.generation == self.generation);
    }

    fn emit(&self, event: PeerEvent) {
        let _ = self.events.send(event);
    }
}
