//! webrtc-rs backed collaborators for `tandem-client` sessions.

mod camera;
mod config;
mod connection;

pub use camera::{RtcStream, SyntheticCamera};
pub use config::RtcConfig;
pub use connection::{RtcConnector, RtcPeer};
