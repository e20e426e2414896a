use std::fmt;

use tandem_core::CodecError;
use thiserror::Error;

use crate::session::SessionState;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media device unavailable: {0}")]
    Unavailable(String),

    #[error("media access denied: {0}")]
    Denied(String),

    #[error("constraints request neither audio nor video")]
    NothingRequested,
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("{op} failed: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("peer connection is closed")]
    Closed,
}

impl PeerError {
    pub fn op(op: &'static str, source: impl Into<anyhow::Error>) -> Self {
        PeerError::Operation {
            op,
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("transport has not joined a room")]
    NotJoined,

    #[error("room `{0}` already has two participants")]
    RoomFull(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Step of the offer/answer exchange that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStage {
    CreatePeerConnection,
    AddTrack,
    CreateOffer,
    CreateAnswer,
    SetLocalDescription,
    SetRemoteDescription,
}

impl fmt::Display for NegotiationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationStage::CreatePeerConnection => "peer connection setup",
            NegotiationStage::AddTrack => "track binding",
            NegotiationStage::CreateOffer => "offer creation",
            NegotiationStage::CreateAnswer => "answer creation",
            NegotiationStage::SetLocalDescription => "local description",
            NegotiationStage::SetRemoteDescription => "remote description",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("media acquisition failed: {0}")]
    MediaAcquisition(#[from] MediaError),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("negotiation failed during {stage}: {source}")]
    Negotiation {
        stage: NegotiationStage,
        #[source]
        source: PeerError,
    },

    #[error("offer received while already offering")]
    RoleConflict,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("candidate received before a peer connection exists")]
    OrphanCandidate,

    #[error("`{event}` is not expected in state {state}")]
    UnexpectedEvent {
        event: &'static str,
        state: SessionState,
    },

    #[error("message addressed to room `{0}` ignored")]
    Misrouted(String),

    #[error("session was already started")]
    AlreadyStarted,
}

impl SessionError {
    pub(crate) fn negotiation(stage: NegotiationStage) -> impl FnOnce(PeerError) -> Self {
        move |source| SessionError::Negotiation { stage, source }
    }

    /// Fatal errors end the session; the rest only drop the offending message.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::MediaAcquisition(_)
                | SessionError::Transport(_)
                | SessionError::Negotiation { .. }
                | SessionError::RoleConflict
        )
    }
}
