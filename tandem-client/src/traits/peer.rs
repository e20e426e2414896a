use async_trait::async_trait;
use std::fmt;
use tandem_core::{IceCandidateInit, SessionDescription};

use crate::error::PeerError;
use crate::event::EventSender;
use crate::traits::media::MediaStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpType {
    Offer,
    Answer,
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpType::Offer => write!(f, "offer"),
            SdpType::Answer => write!(f, "answer"),
        }
    }
}

/// One WebRTC-style connection object.
///
/// ICE discovery, remote tracks and link state changes are reported through the
/// event queue given to [`PeerConnector::create`].
#[async_trait]
pub trait PeerConnection: Send + Sync {
    type Stream: MediaStream;

    async fn create_offer(&self) -> Result<SessionDescription, PeerError>;

    async fn create_answer(&self) -> Result<SessionDescription, PeerError>;

    async fn set_local_description(
        &self,
        kind: SdpType,
        sdp: &SessionDescription,
    ) -> Result<(), PeerError>;

    async fn set_remote_description(
        &self,
        kind: SdpType,
        sdp: &SessionDescription,
    ) -> Result<(), PeerError>;

    async fn add_ice_candidate(&self, candidate: &IceCandidateInit) -> Result<(), PeerError>;

    async fn add_track(
        &self,
        track: <Self::Stream as MediaStream>::Track,
        stream: &Self::Stream,
    ) -> Result<(), PeerError>;

    async fn close(&self) -> Result<(), PeerError>;
}

/// Builds peer connections on demand.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    type Connection: PeerConnection;

    async fn create(&self, events: EventSender) -> Result<Self::Connection, PeerError>;
}
