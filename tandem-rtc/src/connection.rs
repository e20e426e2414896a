use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tandem_client::{
    EventSender, LinkState, MediaStream, PeerConnection, PeerConnector, PeerError, RemoteTrack,
    SdpType, SessionEvent,
};
use tandem_core::{IceCandidateInit, SessionDescription, TrackKind};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

use crate::camera::RtcStream;
use crate::config::RtcConfig;

/// Builds one webrtc-rs peer connection per negotiation.
#[derive(Debug, Clone, Default)]
pub struct RtcConnector {
    config: RtcConfig,
}

impl RtcConnector {
    pub fn new(config: RtcConfig) -> Self {
        Self { config }
    }

    async fn build(&self, events: EventSender) -> Result<RtcPeer> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()
            .context("Failed to register default codecs")?;
        let registry = register_default_interceptors(Registry::new(), &mut m)
            .context("Failed to register interceptors")?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let peer_connection = Arc::new(
            api.new_peer_connection(self.config.to_rtc_configuration())
                .await
                .context("Failed to create peer connection")?,
        );

        // Callbacks must be 'static, so each one owns a clone of the queue.
        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    info!("Peer Connection State changed: {:?}", s);
                    if let Some(link) = link_state(s) {
                        let _ = tx.send(SessionEvent::LinkState(link)).await;
                    }
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                // None marks the end of gathering.
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(SessionEvent::LocalCandidate(from_rtc_candidate(init)))
                    .await;
            })
        }));

        let track_tx = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    let remote = RemoteTrack {
                        stream_id: track.stream_id(),
                        track_id: track.id(),
                        kind: match track.kind() {
                            RTPCodecType::Audio => TrackKind::Audio,
                            _ => TrackKind::Video,
                        },
                    };
                    let _ = tx.send(SessionEvent::RemoteTrack(remote)).await;

                    // Nothing renders the media; keep the receive buffer drained.
                    tokio::spawn(async move {
                        let mut packets = 0u64;
                        while track.read_rtp().await.is_ok() {
                            packets += 1;
                        }
                        debug!("Remote track {} ended after {} packets", track.id(), packets);
                    });
                })
            },
        ));

        Ok(RtcPeer { peer_connection })
    }
}

#[async_trait]
impl PeerConnector for RtcConnector {
    type Connection = RtcPeer;

    async fn create(&self, events: EventSender) -> Result<RtcPeer, PeerError> {
        self.build(events)
            .await
            .map_err(|e| PeerError::op("new_peer_connection", e))
    }
}

pub struct RtcPeer {
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcPeer {
    pub fn inner(&self) -> &Arc<RTCPeerConnection> {
        &self.peer_connection
    }
}

#[async_trait]
impl PeerConnection for RtcPeer {
    type Stream = RtcStream;

    async fn create_offer(&self) -> Result<SessionDescription, PeerError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| PeerError::op("create_offer", e))?;
        Ok(offer.sdp.into())
    }

    async fn create_answer(&self) -> Result<SessionDescription, PeerError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| PeerError::op("create_answer", e))?;
        Ok(answer.sdp.into())
    }

    async fn set_local_description(
        &self,
        kind: SdpType,
        sdp: &SessionDescription,
    ) -> Result<(), PeerError> {
        let desc = to_rtc_description(kind, sdp)
            .map_err(|e| PeerError::op("set_local_description", e))?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(|e| PeerError::op("set_local_description", e))
    }

    async fn set_remote_description(
        &self,
        kind: SdpType,
        sdp: &SessionDescription,
    ) -> Result<(), PeerError> {
        let desc = to_rtc_description(kind, sdp)
            .map_err(|e| PeerError::op("set_remote_description", e))?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| PeerError::op("set_remote_description", e))
    }

    async fn add_ice_candidate(&self, candidate: &IceCandidateInit) -> Result<(), PeerError> {
        self.peer_connection
            .add_ice_candidate(to_rtc_candidate(candidate))
            .await
            .map_err(|e| PeerError::op("add_ice_candidate", e))
    }

    async fn add_track(
        &self,
        track: Arc<TrackLocalStaticSample>,
        stream: &RtcStream,
    ) -> Result<(), PeerError> {
        debug!("Adding track {} of stream {}", track.id(), stream.id());
        let sender = self
            .peer_connection
            .add_track(track as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .map_err(|e| PeerError::op("add_track", e))?;

        // Interceptors only run while RTCP is being read.
        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while let Ok((_, _)) = sender.read(&mut rtcp_buf).await {}
        });
        Ok(())
    }

    async fn close(&self) -> Result<(), PeerError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| PeerError::op("close", e))
    }
}

fn to_rtc_description(
    kind: SdpType,
    sdp: &SessionDescription,
) -> webrtc::error::Result<RTCSessionDescription> {
    let sdp = sdp.as_str().to_owned();
    match kind {
        SdpType::Offer => RTCSessionDescription::offer(sdp),
        SdpType::Answer => RTCSessionDescription::answer(sdp),
    }
}

fn link_state(state: RTCPeerConnectionState) -> Option<LinkState> {
    match state {
        RTCPeerConnectionState::New => Some(LinkState::New),
        RTCPeerConnectionState::Connecting => Some(LinkState::Connecting),
        RTCPeerConnectionState::Connected => Some(LinkState::Connected),
        RTCPeerConnectionState::Disconnected => Some(LinkState::Disconnected),
        RTCPeerConnectionState::Failed => Some(LinkState::Failed),
        RTCPeerConnectionState::Closed => Some(LinkState::Closed),
        _ => None,
    }
}

fn to_rtc_candidate(candidate: &IceCandidateInit) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate.clone(),
        sdp_mid: candidate.sdp_mid.clone(),
        sdp_mline_index: candidate.sdp_m_line_index,
        username_fragment: candidate.username_fragment.clone(),
    }
}

fn from_rtc_candidate(init: RTCIceCandidateInit) -> IceCandidateInit {
    IceCandidateInit {
        candidate: init.candidate,
        sdp_mid: init.sdp_mid,
        sdp_m_line_index: init.sdp_mline_index,
        username_fragment: init.username_fragment,
    }
}
