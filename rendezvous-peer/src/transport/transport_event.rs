use rendezvous_core::IceCandidate;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use webrtc::track::track_remote::TrackRemote;

/// Something the transport noticed without being asked.
#[derive(Debug)]
pub enum TransportEvent {
    LocalCandidate(IceCandidate),
    Connected,
    RemoteTrack(RemoteTrack),
    Failed(String),
}

/// Incoming media announced by the remote peer.
#[derive(Clone)]
pub struct RemoteTrack {
    pub track_id: String,
    pub stream_id: String,
    pub kind: String,
    /// The live track when the transport is backed by `webrtc`.
    pub track: Option<Arc<TrackRemote>>,
}

impl fmt::Debug for RemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrack")
            .field("track_id", &self.track_id)
            .field("stream_id", &self.stream_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Handed to a transport at creation time; the owning session consumes the
/// other end.
#[derive(Debug, Clone)]
pub struct TransportEvents {
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportEvents {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn local_candidate(&self, candidate: IceCandidate) -> bool {
        self.emit(TransportEvent::LocalCandidate(candidate))
    }

    pub fn connected(&self) -> bool {
        self.emit(TransportEvent::Connected)
    }

    pub fn remote_track(&self, track: RemoteTrack) -> bool {
        self.emit(TransportEvent::RemoteTrack(track))
    }

    pub fn failed(&self, reason: impl Into<String>) -> bool {
        self.emit(TransportEvent::Failed(reason.into()))
    }

    fn emit(&self, event: TransportEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}
