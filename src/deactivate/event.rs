//! Push-event envelope.
//!
//! The delivery system wraps the publisher's payload in an envelope with a
//! base64-encoded data field. The payload itself is advisory (the target
//! comes from configuration, not from the message); it is decoded for the
//! log stream only.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

/// Envelope delivered by the push subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushMessage {
    /// Base64-encoded publisher payload.
    #[serde(default)]
    pub data: String,

    #[serde(default, rename = "messageId")]
    pub message_id: String,
}

impl PushMessage {
    /// Decode the payload for logging. Returns `None` when the field is
    /// absent, not base64, or not UTF-8.
    pub fn decoded_data(&self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let bytes = BASE64.decode(&self.data).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_and_decodes() {
        let raw = r#"{
            "message": {"data": "c2NhbGUtZG93bg==", "messageId": "m-1"},
            "subscription": "projects/p/subscriptions/idle-timeout"
        }"#;
        let envelope: PushEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.message.message_id, "m-1");
        assert_eq!(envelope.message.decoded_data().as_deref(), Some("scale-down"));
    }

    #[test]
    fn missing_or_bad_data_decodes_to_none() {
        let envelope: PushEnvelope =
            serde_json::from_str(r#"{"message": {"messageId": "m-2"}}"#).unwrap();
        assert_eq!(envelope.message.decoded_data(), None);

        let envelope: PushEnvelope =
            serde_json::from_str(r#"{"message": {"data": "%%%not-base64%%%"}}"#).unwrap();
        assert_eq!(envelope.message.decoded_data(), None);
    }
}
