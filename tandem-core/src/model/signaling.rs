use crate::model::identity::Identity;
use crate::utils::{
    DEFAULT_STUN_ADDR, DEFAULT_TURN_ADDR, DEFAULT_TURN_ADDR_2, DEFAULT_TURN_ADDR_3,
    DEFAULT_TURN_CREDENTIAL, DEFAULT_TURN_USERNAME,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn turn(url: impl Into<String>, username: &str, credential: &str) -> Self {
        Self {
            urls: vec![url.into()],
            username: Some(username.to_owned()),
            credential: Some(credential.to_owned()),
        }
    }

    /// Public STUN plus the openrelay TURN fallbacks.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::stun(DEFAULT_STUN_ADDR),
            Self::turn(DEFAULT_TURN_ADDR, DEFAULT_TURN_USERNAME, DEFAULT_TURN_CREDENTIAL),
            Self::turn(DEFAULT_TURN_ADDR_2, DEFAULT_TURN_USERNAME, DEFAULT_TURN_CREDENTIAL),
            Self::turn(DEFAULT_TURN_ADDR_3, DEFAULT_TURN_USERNAME, DEFAULT_TURN_CREDENTIAL),
        ]
    }
}

/// SDP blob. Never inspected, only forwarded between the peer connection and the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SessionDescription(pub String);

impl SessionDescription {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionDescription {
    fn from(sdp: String) -> Self {
        Self(sdp)
    }
}

impl From<&str> for SessionDescription {
    fn from(sdp: &str) -> Self {
        Self(sdp.to_owned())
    }
}

/// Same field layout as the browser `RTCIceCandidateInit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidateInit {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        default,
        rename = "sdpMLineIndex",
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidateInit {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalingMessage {
    Offer { sdp: SessionDescription },
    Answer { sdp: SessionDescription },
    Candidate { candidate: IceCandidateInit },
}

impl SignalingMessage {
    pub const KINDS: [&'static str; 3] = ["offer", "answer", "candidate"];

    pub fn kind(&self) -> &'static str {
        match self {
            SignalingMessage::Offer { .. } => "offer",
            SignalingMessage::Answer { .. } => "answer",
            SignalingMessage::Candidate { .. } => "candidate",
        }
    }

    pub fn offer(sdp: impl Into<SessionDescription>) -> Self {
        SignalingMessage::Offer { sdp: sdp.into() }
    }

    pub fn answer(sdp: impl Into<SessionDescription>) -> Self {
        SignalingMessage::Answer { sdp: sdp.into() }
    }

    pub fn candidate(candidate: IceCandidateInit) -> Self {
        SignalingMessage::Candidate { candidate }
    }
}

/// What actually travels through the relay: the message plus its sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    pub username: String,
    pub room: String,
    pub data: SignalingMessage,
}

impl Envelope {
    pub fn new(from: &Identity, data: SignalingMessage) -> Self {
        Self {
            username: from.username.clone(),
            room: from.room.clone(),
            data,
        }
    }

    pub fn sender(&self) -> Identity {
        Identity::new(self.username.clone(), self.room.clone())
    }
}
