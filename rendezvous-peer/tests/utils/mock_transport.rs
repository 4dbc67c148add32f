use async_trait::async_trait;
use rendezvous_core::{ConnectionId, IceCandidate, SdpType, SessionDescription};
use rendezvous_peer::{
    NegotiationError, PeerTransport, TransportConfig, TransportEvents, TransportFactory,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted transport: trickles one local candidate per description and
/// reports itself connected once both descriptions are in place.
pub struct MockTransport {
    remote: ConnectionId,
    events: TransportEvents,
    log: Arc<Mutex<Vec<String>>>,
    fail_offer: bool,
    has_local: AtomicBool,
    has_remote: AtomicBool,
}

impl MockTransport {
    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn description(&self, kind: SdpType) -> SessionDescription {
        self.has_local.store(true, Ordering::SeqCst);
        self.events.local_candidate(IceCandidate::new(format!(
            "candidate:mock {:?} for {}",
            kind, self.remote
        )));
        self.maybe_connected();
        SessionDescription {
            kind,
            sdp: format!("v=0\r\ns=mock {:?}\r\n", kind),
        }
    }

    fn maybe_connected(&self) {
        if self.has_local.load(Ordering::SeqCst) && self.has_remote.load(Ordering::SeqCst) {
            self.events.connected();
        }
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        self.record("create-offer".into());
        if self.fail_offer {
            return Err(NegotiationError::Description {
                kind: SdpType::Offer,
                reason: "scripted failure".into(),
            });
        }
        Ok(self.description(SdpType::Offer))
    }

    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError> {
        self.record("create-answer".into());
        Ok(self.description(SdpType::Answer))
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), NegotiationError> {
        self.record(format!("remote:{:?}", description.kind));
        self.has_remote.store(true, Ordering::SeqCst);
        self.maybe_connected();
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        self.record(format!("apply:{}", candidate.candidate));
        Ok(())
    }

    async fn close(&self) -> Result<(), NegotiationError> {
        self.record("close".into());
        Ok(())
    }
}

/// Hands out [`MockTransport`]s and keeps every call they saw, per remote.
#[derive(Default)]
pub struct MockTransportFactory {
    logs: Mutex<Vec<(ConnectionId, Arc<Mutex<Vec<String>>>)>>,
    fail_offers: AtomicBool,
}

impl MockTransportFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_offers() -> Arc<Self> {
        let factory = Self::default();
        factory.fail_offers.store(true, Ordering::SeqCst);
        Arc::new(factory)
    }

    /// Calls seen by every transport created for `remote`, oldest first.
    pub fn log_for(&self, remote: &ConnectionId) -> Vec<String> {
        self.logs
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == remote)
            .flat_map(|(_, log)| log.lock().unwrap().clone())
            .collect()
    }

    pub fn created(&self) -> usize {
        self.logs.lock().unwrap().len()
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        remote: &ConnectionId,
        _config: TransportConfig,
        events: TransportEvents,
    ) -> Result<Box<dyn PeerTransport>, NegotiationError> {
        let log = Arc::new(Mutex::new(Vec::new()));
        self.logs.lock().unwrap().push((remote.clone(), log.clone()));

        Ok(Box::new(MockTransport {
            remote: remote.clone(),
            events,
            log,
            fail_offer: self.fail_offers.load(Ordering::SeqCst),
            has_local: AtomicBool::new(false),
            has_remote: AtomicBool::new(false),
        }))
    }
}
