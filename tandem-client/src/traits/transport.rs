use async_trait::async_trait;
use tandem_core::Identity;

use crate::error::TransportError;
use crate::event::EventSender;

/// Relay connection between the two participants of a room.
///
/// Incoming `ready` and `data` deliveries are pushed into the `events` queue
/// handed over on connect, as [`SessionEvent::PeerReady`] and
/// [`SessionEvent::Signal`].
///
/// [`SessionEvent::PeerReady`]: crate::SessionEvent::PeerReady
/// [`SessionEvent::Signal`]: crate::SessionEvent::Signal
#[async_trait]
pub trait TransportChannel: Send {
    async fn connect(&mut self, events: EventSender) -> Result<(), TransportError>;

    /// Announce the identity to its room.
    async fn join(&mut self, identity: &Identity) -> Result<(), TransportError>;

    /// Emit an encoded payload to the other room member.
    async fn send(&mut self, payload: String) -> Result<(), TransportError>;

    async fn disconnect(&mut self);

    fn is_connected(&self) -> bool;
}
