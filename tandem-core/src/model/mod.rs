mod identity;
mod media;
mod signaling;

pub use identity::Identity;
pub use media::{MediaConstraints, TrackKind, VideoConstraints};
pub use signaling::{Envelope, IceCandidateInit, IceServerConfig, SessionDescription, SignalingMessage};
