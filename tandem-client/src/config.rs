use tandem_core::MediaConstraints;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Constraints passed to the media source on start.
    pub media: MediaConstraints,
    /// Capacity of the session event queue shared by transport and peer callbacks.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            media: MediaConstraints::default(),
            event_capacity: 256,
        }
    }
}
