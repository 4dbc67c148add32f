use rendezvous_core::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, IceServerConfig};
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// Per-connection media settings.
#[derive(Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Add a receive-only audio transceiver when no local audio is sent.
    pub receive_audio: bool,
    pub receive_video: bool,
    pub local_tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
                username: None,
                credential: None,
            }],
            receive_audio: true,
            receive_video: true,
            local_tracks: Vec::new(),
        }
    }
}

impl TransportConfig {
    /// Data-only connection with no media sections.
    pub fn without_media() -> Self {
        Self {
            receive_audio: false,
            receive_video: false,
            ..Self::default()
        }
    }

    pub fn with_local_track(mut self, track: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        self.local_tracks.push(track);
        self
    }
}
