use async_trait::async_trait;
use tandem_core::MediaConstraints;

use crate::error::MediaError;

/// Local capture stream. Tracks are shared handles: binding one to a peer
/// connection attaches it, it does not copy it.
pub trait MediaStream: Send + Sync + 'static {
    type Track: Clone + Send + Sync + 'static;

    fn id(&self) -> &str;

    fn tracks(&self) -> Vec<Self::Track>;

    /// Stop every track. Calling it again has no effect.
    fn stop(&mut self);
}

#[async_trait]
pub trait MediaSource: Send {
    type Stream: MediaStream;

    async fn acquire(&mut self, constraints: &MediaConstraints) -> Result<Self::Stream, MediaError>;
}
