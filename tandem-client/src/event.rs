use std::fmt;

use tandem_core::{IceCandidateInit, TrackKind};
use tokio::sync::mpsc;

/// Handed to collaborators so they can feed the session queue.
pub type EventSender = mpsc::Sender<SessionEvent>;

/// Everything a session reacts to after start.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Relay connection is up.
    TransportOpened,
    /// Relay connection went away.
    TransportClosed,
    /// A second participant joined the room.
    PeerReady,
    /// Raw relay payload from the other participant.
    Signal(String),
    /// ICE candidate gathered by the local peer connection.
    LocalCandidate(IceCandidateInit),
    /// The peer connection received a remote track.
    RemoteTrack(RemoteTrack),
    /// The peer connection changed its link state.
    LinkState(LinkState),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::TransportOpened => "transport-open",
            SessionEvent::TransportClosed => "transport-close",
            SessionEvent::PeerReady => "ready",
            SessionEvent::Signal(_) => "data",
            SessionEvent::LocalCandidate(_) => "local-candidate",
            SessionEvent::RemoteTrack(_) => "remote-track",
            SessionEvent::LinkState(_) => "link-state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub stream_id: String,
    pub track_id: String,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkState::New => "new",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Disconnected => "disconnected",
            LinkState::Failed => "failed",
            LinkState::Closed => "closed",
        };
        f.write_str(name)
    }
}
