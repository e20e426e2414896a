//! Seams to the collaborators a session drives but does not implement.

mod media;
mod peer;
mod transport;
mod viewport;

pub use media::{MediaSource, MediaStream};
pub use peer::{PeerConnection, PeerConnector, SdpType};
pub use transport::TransportChannel;
pub use viewport::{NullViewport, Viewport};
