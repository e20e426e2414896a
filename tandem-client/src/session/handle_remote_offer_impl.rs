use tandem_core::{SessionDescription, SignalingMessage};
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
    /// Unsolicited offer: this side answers.
    pub(super) async fn handle_remote_offer(
        &mut self,
        remote_sdp: SessionDescription,
    ) -> Result<(), SessionError> {
        match (self.role, self.state) {
            // Both sides offered. Glare is not resolved.
            (Role::Offerer, SessionState::Negotiating) => {
                return Err(SessionError::RoleConflict);
            }
            (Role::Undetermined, SessionState::Joined) => {}
            (_, state) => {
                return Err(SessionError::UnexpectedEvent {
                    event: "offer",
                    state,
                });
            }
        }

        info!("Received offer, answering");
        self.set_role(Role::Answerer);
        self.set_state(SessionState::Negotiating);

        self.create_peer_connection().await?;

        let answer = {
            let Some(pc) = self.pc.as_ref() else {
                return Err(SessionError::UnexpectedEvent {
                    event: "offer",
                    state: self.state,
                });
            };
            pc.set_remote_description(SdpType::Offer, &remote_sdp)
                .await
                .map_err(SessionError::negotiation(NegotiationStage::SetRemoteDescription))?;
            let answer = pc
                .create_answer()
                .await
                .map_err(SessionError::negotiation(NegotiationStage::CreateAnswer))?;
            pc.set_local_description(SdpType::Answer, &answer)
                .await
                .map_err(SessionError::negotiation(NegotiationStage::SetLocalDescription))?;
            answer
        };
        self.remote_description_set = true;
        info!("Local description set");

        info!("Sending answer");
        self.send(SignalingMessage::Answer { sdp: answer }).await?;

        self.flush_pending_candidates().await;
        self.set_state(SessionState::Connected);
        Ok(())
    }
}
