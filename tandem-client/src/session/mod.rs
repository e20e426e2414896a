use std::fmt;

use tandem_core::{Identity, IceCandidateInit, SignalingMessage, encode};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::{SessionError, TransportError};
use crate::event::{EventSender, RemoteTrack, SessionEvent};
use crate::traits::{
    MediaSource, NullViewport, PeerConnection, PeerConnector, TransportChannel, Viewport,
};

mod create_pc_impl;
mod handle_remote_offer_impl;
mod handle_signal_impl;
mod init_offer_impl;
mod start_impl;
mod stop_impl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    MediaReady,
    Joined,
    Negotiating,
    Connected,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::MediaReady => "media-ready",
            SessionState::Joined => "joined",
            SessionState::Negotiating => "negotiating",
            SessionState::Connected => "connected",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Chosen once per session, never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Undetermined,
    Offerer,
    Answerer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Undetermined => "undetermined",
            Role::Offerer => "offerer",
            Role::Answerer => "answerer",
        };
        f.write_str(name)
    }
}

/// Snapshot published to observers on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub role: Role,
}

/// One participant's side of a two-party media session.
///
/// Owns the local stream, the lazily created peer connection and the relay
/// channel. Every external callback arrives as a [`SessionEvent`] on the
/// session's own queue and is handled to completion before the next one.
pub struct Session<M, C>
where
    M: MediaSource,
    C: PeerConnector,
    C::Connection: PeerConnection<Stream = M::Stream>,
{
    config: SessionConfig,
    identity: Option<Identity>,
    role: Role,
    state: SessionState,

    media: M,
    connector: C,
    transport: Box<dyn TransportChannel>,
    viewport: Box<dyn Viewport>,

    local_stream: Option<M::Stream>,
    pc: Option<C::Connection>,
    remote_description_set: bool,
    pending_candidates: Vec<IceCandidateInit>,
    remote_tracks: Vec<RemoteTrack>,

    event_tx: EventSender,
    event_rx: mpsc::Receiver<SessionEvent>,
    status_tx: watch::Sender<SessionStatus>,
}

impl<M, C> Session<M, C>
where
    M: MediaSource,
    C: PeerConnector,
    C::Connection: PeerConnection<Stream = M::Stream>,
{
    pub fn new(
        config: SessionConfig,
        media: M,
        connector: C,
        transport: Box<dyn TransportChannel>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity.max(1));
        let (status_tx, _) = watch::channel(SessionStatus {
            state: SessionState::Idle,
            role: Role::Undetermined,
        });

        Self {
            config,
            identity: None,
            role: Role::Undetermined,
            state: SessionState::Idle,
            media,
            connector,
            transport,
            viewport: Box::new(NullViewport),
            local_stream: None,
            pc: None,
            remote_description_set: false,
            pending_candidates: Vec::new(),
            remote_tracks: Vec::new(),
            event_tx,
            event_rx,
            status_tx,
        }
    }

    pub fn with_viewport(mut self, viewport: Box<dyn Viewport>) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn has_peer_connection(&self) -> bool {
        self.pc.is_some()
    }

    pub fn remote_tracks(&self) -> &[RemoteTrack] {
        &self.remote_tracks
    }

    /// Queue handle for embedders that deliver events themselves.
    pub fn event_sender(&self) -> EventSender {
        self.event_tx.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// Drive the session until shutdown is signalled or a fatal error occurs.
    ///
    /// Shutdown wins over an event that is still being handled: the pending
    /// work is dropped mid-flight and teardown runs instead. Dropping the
    /// shutdown sender counts as a shutdown signal. Teardown always runs before
    /// this returns.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        info!("Session event loop started");

        let result = loop {
            let event = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => {
                    info!("Shutdown requested");
                    break Ok(());
                }
                event = self.event_rx.recv() => match event {
                    Some(e) => e,
                    None => break Ok(()),
                },
            };

            let name = event.name();
            let outcome = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => {
                    info!("Shutdown requested while handling `{}`; abandoning it", name);
                    break Ok(());
                }
                outcome = self.handle_event(event) => outcome,
            };

            if let Err(e) = outcome {
                break Err(e);
            }
            if self.state == SessionState::Closed {
                break Ok(());
            }
        };

        self.stop().await;
        info!("Session event loop finished");
        result
    }

    /// Handle every event already queued, without waiting for new ones.
    pub async fn process_pending(&mut self) -> Result<usize, SessionError> {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Apply a single event. Per-message problems are logged and swallowed;
    /// fatal ones tear the session down and are returned.
    pub async fn handle_event(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            debug!("Session closed, dropping `{}` event", event.name());
            return Ok(());
        }

        match self.dispatch(event).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => {
                error!("Session {} failed: {}", self.display_name(), e);
                self.stop().await;
                Err(e)
            }
            Err(e) => {
                warn!("Dropped message for {}: {}", self.display_name(), e);
                Ok(())
            }
        }
    }

    async fn dispatch(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        match event {
            SessionEvent::TransportOpened => {
                info!("Relay connection open");
                Ok(())
            }
            SessionEvent::TransportClosed => {
                warn!("Relay connection closed");
                Ok(())
            }
            SessionEvent::PeerReady => self.init_offer().await,
            SessionEvent::Signal(payload) => self.handle_signal(&payload).await,
            SessionEvent::LocalCandidate(candidate) => {
                self.forward_local_candidate(candidate).await;
                Ok(())
            }
            SessionEvent::RemoteTrack(track) => {
                info!("Adding remote {} track {}", track.kind, track.track_id);
                self.viewport.show_remote(&track);
                self.remote_tracks.push(track);
                Ok(())
            }
            SessionEvent::LinkState(link) => {
                info!("Peer connection state: {}", link);
                Ok(())
            }
        }
    }

    async fn send(&mut self, message: SignalingMessage) -> Result<(), SessionError> {
        let identity = self
            .identity
            .as_ref()
            .ok_or(TransportError::NotJoined)?;
        let payload = encode(identity, &message)?;
        self.transport.send(payload).await?;
        debug!("Sent {}", message.kind());
        Ok(())
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            debug!("Session state {} -> {}", self.state, state);
            self.state = state;
            self.publish();
        }
    }

    fn set_role(&mut self, role: Role) {
        self.role = role;
        self.publish();
    }

    fn publish(&self) {
        self.status_tx.send_replace(SessionStatus {
            state: self.state,
            role: self.role,
        });
    }

    fn display_name(&self) -> String {
        self.identity
            .as_ref()
            .map(|i| i.to_string())
            .unwrap_or_else(|| "<unstarted>".to_owned())
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // Err means the sender is gone, which is treated the same way.
    let _ = shutdown.wait_for(|stop| *stop).await;
}
