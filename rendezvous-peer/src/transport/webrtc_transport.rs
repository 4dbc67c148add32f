use crate::error::NegotiationError;
use crate::transport::{
    PeerTransport, RemoteTrack, TransportConfig, TransportEvents, TransportFactory,
};
use async_trait::async_trait;
use rendezvous_core::{ConnectionId, IceCandidate, IceServerConfig, SdpType, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_remote::TrackRemote;

/// [`PeerTransport`] backed by a `webrtc` peer connection.
pub struct WebRtcTransport {
    remote: ConnectionId,
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcTransport {
    pub async fn new(
        remote: ConnectionId,
        config: TransportConfig,
        events: TransportEvents,
    ) -> Result<Self, NegotiationError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs().map_err(transport_error)?;
        let registry =
            register_default_interceptors(Registry::new(), &mut m).map_err(transport_error)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config.ice_servers.iter().map(rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(transport_error)?,
        );

        let mut sends_audio = false;
        let mut sends_video = false;
        for track in config.local_tracks {
            match track.kind() {
                RTPCodecType::Audio => sends_audio = true,
                RTPCodecType::Video => sends_video = true,
                _ => {}
            }
            peer_connection
                .add_track(track)
                .await
                .map_err(transport_error)?;
        }

        let receive_only = [
            (config.receive_audio && !sends_audio, RTPCodecType::Audio),
            (config.receive_video && !sends_video, RTPCodecType::Video),
        ];
        for (wanted, kind) in receive_only {
            if !wanted {
                continue;
            }
            peer_connection
                .add_transceiver_from_kind(
                    kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Recvonly,
                        send_encodings: vec![],
                    }),
                )
                .await
                .map_err(transport_error)?;
        }

        let state_events = events.clone();
        let state_remote = remote.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                let remote = state_remote.clone();

                Box::pin(async move {
                    info!("Peer connection with {} is {}", remote, s);
                    match s {
                        RTCPeerConnectionState::Connected => {
                            events.connected();
                        }
                        RTCPeerConnectionState::Failed => {
                            events.failed("peer connection failed");
                        }
                        _ => {}
                    }
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                match candidate.to_json() {
                    Ok(init) => {
                        events.local_candidate(IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_m_line_index: init.sdp_mline_index,
                            username_fragment: init.username_fragment,
                        });
                    }
                    Err(e) => warn!("Dropping unserializable local candidate: {}", e),
                }
            })
        }));

        let track_events = events;
        let track_remote = remote.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let events = track_events.clone();
            let remote = track_remote.clone();

            Box::pin(async move {
                debug!("Remote {} track from {}", track.kind(), remote);
                events.remote_track(RemoteTrack {
                    track_id: track.id(),
                    stream_id: track.stream_id(),
                    kind: track.kind().to_string(),
                    track: Some(track),
                });
            })
        }));

        Ok(Self {
            remote,
            peer_connection,
        })
    }

    pub fn remote(&self) -> &ConnectionId {
        &self.remote
    }

    pub fn peer_connection(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }

    async fn install_local(
        &self,
        kind: SdpType,
        description: RTCSessionDescription,
    ) -> Result<SessionDescription, NegotiationError> {
        let sdp = description.sdp.clone();
        self.peer_connection
            .set_local_description(description)
            .await
            .map_err(|e| description_error(kind, e))?;
        Ok(SessionDescription { kind, sdp })
    }
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription, NegotiationError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| description_error(SdpType::Offer, e))?;
        self.install_local(SdpType::Offer, offer).await
    }

    async fn create_answer(&self) -> Result<SessionDescription, NegotiationError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| description_error(SdpType::Answer, e))?;
        self.install_local(SdpType::Answer, answer).await
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), NegotiationError> {
        let remote_error = |e: webrtc::Error| NegotiationError::RemoteDescription(e.to_string());

        let desc = match description.kind {
            SdpType::Offer => RTCSessionDescription::offer(description.sdp),
            SdpType::Answer => RTCSessionDescription::answer(description.sdp),
        }
        .map_err(remote_error)?;

        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(remote_error)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|e| NegotiationError::Candidate(e.to_string()))
    }

    async fn close(&self) -> Result<(), NegotiationError> {
        self.peer_connection.close().await.map_err(transport_error)
    }
}

/// Creates a [`WebRtcTransport`] per remote peer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebRtcTransportFactory;

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn create(
        &self,
        remote: &ConnectionId,
        config: TransportConfig,
        events: TransportEvents,
    ) -> Result<Box<dyn PeerTransport>, NegotiationError> {
        let transport = WebRtcTransport::new(remote.clone(), config, events).await?;
        Ok(Box::new(transport))
    }
}

fn rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
    }
}

fn transport_error(e: webrtc::Error) -> NegotiationError {
    NegotiationError::Transport(e.to_string())
}

fn description_error(kind: SdpType, e: webrtc::Error) -> NegotiationError {
    NegotiationError::Description {
        kind,
        reason: e.to_string(),
    }
}
