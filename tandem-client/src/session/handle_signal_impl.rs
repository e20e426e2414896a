use tandem_core::{IceCandidateInit, SessionDescription, SignalingMessage, decode_envelope};
use tracing::{debug, info, warn};

use crate::error::{NegotiationStage, SessionError};
use crate::session::{Role, Session, SessionState};
use crate::traits::{MediaSource, PeerConnection, PeerConnector, SdpType};

impl<M, C> Session<M, C>
where
    M: MediaSource,
    C: PeerConnector,
    C::Connection: PeerConnection<Stream = M::Stream>,
{
    /// Route one relay payload. Undecodable payloads never reach the state machine.
    pub(super) async fn handle_signal(&mut self, payload: &str) -> Result<(), SessionError> {
        let envelope = decode_envelope(payload)?;

        if let Some(identity) = &self.identity {
            if envelope.room != identity.room {
                return Err(SessionError::Misrouted(envelope.room));
            }
            if envelope.username == identity.username {
                debug!("Skipping own {} message", envelope.data.kind());
                return Ok(());
            }
        }

        debug!(
            "Data received: {} from {}",
            envelope.data.kind(),
            envelope.username
        );

        match envelope.data {
            SignalingMessage::Offer { sdp } => self.handle_remote_offer(sdp).await,
            SignalingMessage::Answer { sdp } => self.handle_answer(sdp).await,
            SignalingMessage::Candidate { candidate } => {
                self.handle_remote_candidate(candidate).await
            }
        }
    }

    async fn handle_answer(&mut self, sdp: SessionDescription) -> Result<(), SessionError> {
        if self.role != Role::Offerer || self.state != SessionState::Negotiating {
            return Err(SessionError::UnexpectedEvent {
                event: "answer",
                state: self.state,
            });
        }
        let Some(pc) = self.pc.as_ref() else {
            return Err(SessionError::UnexpectedEvent {
                event: "answer",
                state: self.state,
            });
        };

        pc.set_remote_description(SdpType::Answer, &sdp)
            .await
            .map_err(SessionError::negotiation(NegotiationStage::SetRemoteDescription))?;
        self.remote_description_set = true;
        info!("Remote description set (answer)");

        self.flush_pending_candidates().await;
        self.set_state(SessionState::Connected);
        Ok(())
    }

    async fn handle_remote_candidate(
        &mut self,
        candidate: IceCandidateInit,
    ) -> Result<(), SessionError> {
        let Some(pc) = self.pc.as_ref() else {
            return Err(SessionError::OrphanCandidate);
        };

        if !self.remote_description_set {
            debug!("Buffering ICE candidate until the remote description is set");
            self.pending_candidates.push(candidate);
            return Ok(());
        }

        debug!("Adding ICE candidate: {}", candidate.candidate);
        if let Err(e) = pc.add_ice_candidate(&candidate).await {
            warn!("Error adding ICE candidate: {}", e);
        }
        Ok(())
    }

    pub(super) async fn flush_pending_candidates(&mut self) {
        let pending = std::mem::take(&mut self.pending_candidates);
        let Some(pc) = self.pc.as_ref() else {
            return;
        };
        if !pending.is_empty() {
            debug!("Applying {} buffered ICE candidates", pending.len());
        }
        for candidate in pending {
            if let Err(e) = pc.add_ice_candidate(&candidate).await {
                warn!("Error adding buffered ICE candidate: {}", e);
            }
        }
    }

    /// Trickle a locally gathered candidate to the other side, once.
    pub(super) async fn forward_local_candidate(&mut self, candidate: IceCandidateInit) {
        if self.pc.is_none() {
            debug!("Ignoring local candidate without a peer connection");
            return;
        }
        debug!("Sending ICE candidate");
        if let Err(e) = self.send(SignalingMessage::Candidate { candidate }).await {
            warn!("Failed to send ICE candidate: {}", e);
        }
    }
}
