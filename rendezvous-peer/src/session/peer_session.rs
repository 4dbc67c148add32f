use crate::error::NegotiationError;
use crate::session::{CandidateQueue, NegotiationState, SignalSink};
use crate::transport::PeerTransport;
use rendezvous_core::{ClientMessage, ConnectionId, IceCandidate, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One side of the negotiation with a single remote connection.
///
/// Every method runs to completion before the next is called; the owning
/// actor provides that ordering.
pub struct PeerSession {
    remote: ConnectionId,
    local: Option<ConnectionId>,
    state: NegotiationState,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    candidates: CandidateQueue,
    connected: bool,
    transport: Box<dyn PeerTransport>,
    signals: Arc<dyn SignalSink>,
}

impl PeerSession {
    pub fn new(
        remote: ConnectionId,
        local: Option<ConnectionId>,
        transport: Box<dyn PeerTransport>,
        signals: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            remote,
            local,
            state: NegotiationState::Idle,
            local_description: None,
            remote_description: None,
            candidates: CandidateQueue::new(),
            connected: false,
            transport,
            signals,
        }
    }

    pub fn remote(&self) -> &ConnectionId {
        &self.remote
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    pub fn queued_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Initiator path: `Idle -> OfferPending`, offer sent to the remote.
    pub async fn start_offer(&mut self) -> Result<(), NegotiationError> {
        self.expect_state(NegotiationState::Idle, "start-offer")?;
        self.state = NegotiationState::OfferPending;

        let offer = match self.transport.create_offer().await {
            Ok(offer) => offer,
            Err(e) => return Err(self.fail(e).await),
        };

        debug!("Sending offer to {}", self.remote);
        self.local_description = Some(offer.clone());
        self.signals.send(ClientMessage::Offer {
            target: self.remote.clone(),
            caller: self.local.clone(),
            sdp: offer,
        });
        Ok(())
    }

    /// Responder path: `Idle -> AnswerPending`, answer sent back, then
    /// queued candidates applied.
    pub async fn handle_offer(&mut self, offer: SessionDescription) -> Result<(), NegotiationError> {
        self.expect_state(NegotiationState::Idle, "offer")?;

        if let Err(e) = self.transport.set_remote_description(offer.clone()).await {
            return Err(self.fail(e).await);
        }
        self.remote_description = Some(offer);
        self.state = NegotiationState::AnswerPending;

        let answer = match self.transport.create_answer().await {
            Ok(answer) => answer,
            Err(e) => return Err(self.fail(e).await),
        };

        debug!("Sending answer to {}", self.remote);
        self.local_description = Some(answer.clone());
        self.signals.send(ClientMessage::Answer {
            target: self.remote.clone(),
            caller: self.local.clone(),
            sdp: answer,
        });

        self.flush_candidates().await;
        Ok(())
    }

    /// `OfferPending -> Established`. A repeated answer changes nothing.
    pub async fn handle_answer(
        &mut self,
        answer: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.expect_state(NegotiationState::OfferPending, "answer")?;
        if self.remote_description.is_some() {
            return Err(NegotiationError::UnexpectedSignal {
                signal: "answer",
                state: self.state,
            });
        }

        if let Err(e) = self.transport.set_remote_description(answer.clone()).await {
            return Err(self.fail(e).await);
        }
        self.remote_description = Some(answer);

        self.flush_candidates().await;
        self.state = NegotiationState::Established;
        info!("Negotiation with {} established", self.remote);
        Ok(())
    }

    /// Applied at once when the remote description is known, queued otherwise.
    pub async fn handle_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        if self.state.is_closed() {
            return Err(NegotiationError::Closed(self.remote.clone()));
        }

        if self.remote_description.is_none() && self.candidates.push(candidate.clone()) {
            debug!(
                "Queued candidate from {} ({} pending)",
                self.remote,
                self.candidates.len()
            );
            return Ok(());
        }

        self.transport.add_ice_candidate(candidate).await
    }

    /// Forwards a locally discovered candidate. Never queued on this side.
    pub fn local_candidate(&self, candidate: IceCandidate) -> bool {
        if self.state.is_closed() {
            return false;
        }
        self.signals.send(ClientMessage::IceCandidate {
            target: self.remote.clone(),
            caller: self.local.clone(),
            candidate,
        })
    }

    /// Transport reports the media path is up. `true` the first time only.
    pub fn mark_connected(&mut self) -> bool {
        if self.state.is_closed() || self.connected {
            return false;
        }
        if self.state == NegotiationState::AnswerPending {
            self.state = NegotiationState::Established;
            info!("Negotiation with {} established", self.remote);
        }
        self.connected = true;
        true
    }

    /// Terminal. Queued candidates are discarded and the transport closed.
    pub async fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.state = NegotiationState::Closed;
        self.candidates.discard();

        if let Err(e) = self.transport.close().await {
            warn!("Closing transport to {} failed: {}", self.remote, e);
        }
        debug!("Session with {} closed", self.remote);
    }

    async fn flush_candidates(&mut self) {
        for candidate in self.candidates.drain() {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Queued candidate from {} rejected: {}", self.remote, e);
            }
        }
    }

    async fn fail(&mut self, e: NegotiationError) -> NegotiationError {
        warn!("Negotiation with {} failed: {}", self.remote, e);
        self.close().await;
        e
    }

    fn expect_state(
        &self,
        expected: NegotiationState,
        signal: &'static str,
    ) -> Result<(), NegotiationError> {
        if self.state.is_closed() {
            return Err(NegotiationError::Closed(self.remote.clone()));
        }
        if self.state != expected {
            return Err(NegotiationError::UnexpectedSignal {
                signal,
                state: self.state,
            });
        }
        Ok(())
    }
}
