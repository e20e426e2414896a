use tracing::{info, warn};

use crate::session::{Session, SessionState};
use crate::traits::{MediaSource, MediaStream, PeerConnection, PeerConnector};

impl<M, C> Session<M, C>
where
    M: MediaSource,
    C: PeerConnector,
    C::Connection: PeerConnection<Stream = M::Stream>,
{
    /// Release everything the session holds. Safe to call repeatedly.
    ///
    /// Order matters: the peer connection still references the local tracks,
    /// so it is closed before the stream is stopped, and the relay goes last.
    pub async fn stop(&mut self) {
        let mut released = false;

        if let Some(pc) = self.pc.take() {
            if let Err(e) = pc.close().await {
                warn!("Failed to close peer connection: {}", e);
            }
            released = true;
        }

        if let Some(mut stream) = self.local_stream.take() {
            stream.stop();
            released = true;
        }

        if self.transport.is_connected() {
            self.transport.disconnect().await;
            released = true;
        }

        self.pending_candidates.clear();
        self.remote_description_set = false;

        if released {
            self.viewport.clear();
            info!("Session {} torn down", self.display_name());
        }
        self.set_state(SessionState::Closed);
    }
}
