use tandem_core::SignalingMessage;
use tracing::info;

use crate::error::{NegotiationStage, SessionError};
use crate::session::{Role, Session, SessionState};
use crate::traits::{MediaSource, PeerConnection, PeerConnector, SdpType};

impl<M, C> Session<M, C>
where
    M: MediaSource,
    C: PeerConnector,
    C::Connection: PeerConnection<Stream = M::Stream>,
{
    /// `ready`: the other participant arrived, so this side makes the offer.
    pub(super) async fn init_offer(&mut self) -> Result<(), SessionError> {
        if self.role != Role::Undetermined || self.state != SessionState::Joined {
            return Err(SessionError::UnexpectedEvent {
                event: "ready",
                state: self.state,
            });
        }

        info!("Ready to connect, initiating as offerer");
        self.set_role(Role::Offerer);
        self.set_state(SessionState::Negotiating);

        self.create_peer_connection().await?;

        let offer = {
            let Some(pc) = self.pc.as_ref() else {
                return Err(SessionError::UnexpectedEvent {
                    event: "ready",
                    state: self.state,
                });
            };
            let offer = pc
                .create_offer()
                .await
                .map_err(SessionError::negotiation(NegotiationStage::CreateOffer))?;
            pc.set_local_description(SdpType::Offer, &offer)
                .await
                .map_err(SessionError::negotiation(NegotiationStage::SetLocalDescription))?;
            offer
        };
        info!("Local description set");

        info!("Sending offer");
        self.send(SignalingMessage::Offer { sdp: offer }).await
    }
}
