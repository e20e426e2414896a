mod config;
mod error;
mod event;
mod session;
pub mod traits;
pub mod transport;

pub use config::SessionConfig;
pub use error::{MediaError, NegotiationStage, PeerError, SessionError, TransportError};
pub use event::{EventSender, LinkState, RemoteTrack, SessionEvent};
pub use session::{Role, Session, SessionState, SessionStatus};
pub use traits::{
    MediaSource, MediaStream, NullViewport, PeerConnection, PeerConnector, SdpType,
    TransportChannel, Viewport,
};
