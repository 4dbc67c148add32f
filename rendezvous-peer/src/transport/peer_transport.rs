use crate::error::NegotiationError;
use crate::transport::{TransportConfig, TransportEvents};
use async_trait::async_trait;
use rendezvous_core::{ConnectionId, IceCandidate, SessionDescription};

/// The media connection to one remote peer.
///
/// `create_offer` and `create_answer` also install the result as the local
/// description.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError>;

    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), NegotiationError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError>;

    async fn close(&self) -> Result<(), NegotiationError>;
}

/// Builds one transport per remote peer. Everything the transport discovers
/// on its own is reported through `events`.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        remote: &ConnectionId,
        config: TransportConfig,
        events: TransportEvents,
    ) -> Result<Box<dyn PeerTransport>, NegotiationError>;
}
