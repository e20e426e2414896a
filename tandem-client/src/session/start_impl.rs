use tandem_core::Identity;
use tracing::{error, info};

use crate::error::{SessionError, TransportError};
use crate::session::{Session, SessionState};
use crate::traits::{MediaSource, MediaStream, PeerConnection, PeerConnector};

impl<M, C> Session<M, C>
where
    M: MediaSource,
    C: PeerConnector,
    C::Connection: PeerConnection<Stream = M::Stream>,
{
    /// Acquire local media, bind it to the local surface, then join the room.
    ///
    /// The relay is only contacted once media is in hand; a media failure
    /// closes the session without ever connecting it.
    pub async fn start(&mut self, identity: Identity) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted);
        }

        info!("Starting session for {}", identity);
        self.identity = Some(identity.clone());

        let stream = match self.media.acquire(&self.config.media).await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Stream not found: {}", e);
                self.set_state(SessionState::Closed);
                return Err(e.into());
            }
        };

        info!("Local stream {} found", stream.id());
        self.viewport.show_local(stream.id());
        self.local_stream = Some(stream);
        self.set_state(SessionState::MediaReady);

        if let Err(e) = self.join_room(&identity).await {
            error!("Failed to join room {}: {}", identity.room, e);
            self.stop().await;
            return Err(e.into());
        }

        info!("Joined room {} as {}", identity.room, identity.username);
        self.set_state(SessionState::Joined);
        Ok(())
    }

    async fn join_room(&mut self, identity: &Identity) -> Result<(), TransportError> {
        self.transport.connect(self.event_tx.clone()).await?;
        self.transport.join(identity).await
    }
}
