//! Wire codec for relay payloads.
//!
//! A payload is a JSON object `{ "username", "room", "data" }` where `data`
//! carries a `type` discriminator of `offer`, `answer` or `candidate`:
//!
//! ```json
//! {"username":"alice","room":"room1","data":{"type":"offer","sdp":"v=0..."}}
//! ```

use crate::model::{Envelope, Identity, SignalingMessage};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to serialize signaling payload: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("malformed signaling payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("signaling payload carries no message kind")]
    MissingKind,

    #[error("unknown signaling message kind `{0}`")]
    UnknownMessageKind(String),
}

/// Wraps `message` in an envelope stamped with the sender identity.
pub fn encode(from: &Identity, message: &SignalingMessage) -> Result<String, CodecError> {
    let envelope = Envelope::new(from, message.clone());
    serde_json::to_string(&envelope).map_err(CodecError::Serialize)
}

pub fn decode(payload: &str) -> Result<SignalingMessage, CodecError> {
    decode_envelope(payload).map(|envelope| envelope.data)
}

pub fn decode_envelope(payload: &str) -> Result<Envelope, CodecError> {
    let value: Value = serde_json::from_str(payload)?;

    // Check the discriminator by hand so an unsupported kind is reported as such
    // instead of as a generic shape mismatch.
    if let Some(data) = value.get("data") {
        let kind = data.get("type").ok_or(CodecError::MissingKind)?;
        match kind.as_str() {
            Some(kind) if SignalingMessage::KINDS.contains(&kind) => {}
            Some(kind) => return Err(CodecError::UnknownMessageKind(kind.to_owned())),
            None => return Err(CodecError::UnknownMessageKind(kind.to_string())),
        }
    }

    Ok(serde_json::from_value(value)?)
}
