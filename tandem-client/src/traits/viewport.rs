use tracing::debug;

use crate::event::RemoteTrack;

/// Where local and remote video ends up. Rendering is not our concern.
pub trait Viewport: Send {
    fn show_local(&mut self, stream_id: &str);

    fn show_remote(&mut self, track: &RemoteTrack);

    fn clear(&mut self);
}

#[derive(Debug, Default)]
pub struct NullViewport;

impl Viewport for NullViewport {
    fn show_local(&mut self, stream_id: &str) {
        debug!("Local stream {} bound", stream_id);
    }

    fn show_remote(&mut self, track: &RemoteTrack) {
        debug!(
            "Remote {} track {} bound (stream {})",
            track.kind, track.track_id, track.stream_id
        );
    }

    fn clear(&mut self) {}
}
