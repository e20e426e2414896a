use tracing::info;

use crate::error::{NegotiationStage, SessionError};
use crate::session::Session;
use crate::traits::{MediaSource, MediaStream, PeerConnection, PeerConnector};

impl<M, C> Session<M, C>
where
    M: MediaSource,
    C: PeerConnector,
    C::Connection: PeerConnection<Stream = M::Stream>,
{
    /// Build the peer connection and attach every local track to it.
    pub(super) async fn create_peer_connection(&mut self) -> Result<(), SessionError> {
        let Some(stream) = self.local_stream.as_ref() else {
            return Err(SessionError::UnexpectedEvent {
                event: "negotiation",
                state: self.state,
            });
        };

        let pc = self
            .connector
            .create(self.event_tx.clone())
            .await
            .map_err(SessionError::negotiation(NegotiationStage::CreatePeerConnection))?;
        // Stored before binding so teardown closes it if a track fails.
        let pc = self.pc.insert(pc);

        let tracks = stream.tracks();
        let count = tracks.len();
        for track in tracks {
            pc.add_track(track, stream)
                .await
                .map_err(SessionError::negotiation(NegotiationStage::AddTrack))?;
        }

        info!("PeerConnection created with {} local tracks", count);
        Ok(())
    }
}
