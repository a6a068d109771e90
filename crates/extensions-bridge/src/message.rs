use mailassist_core_types::GenerationSettings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BridgeError;

pub const SETTINGS_SUBMITTED: &str = "AI_REPLY_SETTINGS";
pub const COMPLETION: &str = "AI_REPLY_COMPLETE";
pub const CLOSE: &str = "CLOSE_POPUP";

const KNOWN_TYPES: [&str; 3] = [SETTINGS_SUBMITTED, COMPLETION, CLOSE];

/// Messages exchanged between the settings surface and the host page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryMessage {
    /// Surface → host: the user asked for a reply with these settings.
    #[serde(rename = "AI_REPLY_SETTINGS")]
    SettingsSubmitted { settings: GenerationSettings },

    /// Host → surface: the reply was inserted.
    #[serde(rename = "AI_REPLY_COMPLETE")]
    Completion,

    /// Surface → host: tear the overlay down.
    #[serde(rename = "CLOSE_POPUP")]
    Close,
}

impl BoundaryMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            BoundaryMessage::SettingsSubmitted { .. } => SETTINGS_SUBMITTED,
            BoundaryMessage::Completion => COMPLETION,
            BoundaryMessage::Close => CLOSE,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Validates a raw payload received from the other side of the boundary.
    pub fn decode(raw: &Value) -> Result<Self, BridgeError> {
        let object = raw.as_object().ok_or(BridgeError::NotAnObject)?;
        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(BridgeError::MissingType)?;
        if !KNOWN_TYPES.contains(&kind) {
            return Err(BridgeError::UnknownType(kind.to_string()));
        }
        serde_json::from_value(raw.clone()).map_err(|err| BridgeError::Malformed {
            kind: kind.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailassist_core_types::Tone;
    use serde_json::json;

    #[test]
    fn settings_message_wire_shape() {
        let message = BoundaryMessage::SettingsSubmitted {
            settings: GenerationSettings {
                tone: Tone::Friendly,
                include_names: false,
                include_signature: true,
                keep_formatting: false,
            },
        };
        assert_eq!(
            message.to_value(),
            json!({
                "type": "AI_REPLY_SETTINGS",
                "settings": {
                    "tone": "friendly",
                    "includeNames": false,
                    "includeSignature": true,
                    "keepFormatting": false
                }
            })
        );
        assert_eq!(BoundaryMessage::decode(&message.to_value()).unwrap(), message);
    }

    #[test]
    fn unit_messages_decode() {
        assert_eq!(
            BoundaryMessage::decode(&json!({"type": "AI_REPLY_COMPLETE"})).unwrap(),
            BoundaryMessage::Completion
        );
        assert_eq!(
            BoundaryMessage::decode(&json!({"type": "CLOSE_POPUP"})).unwrap(),
            BoundaryMessage::Close
        );
    }

    #[test]
    fn rejects_unknown_and_malformed_payloads() {
        assert_eq!(
            BoundaryMessage::decode(&json!({"type": "PING"})),
            Err(BridgeError::UnknownType("PING".into()))
        );
        assert_eq!(
            BoundaryMessage::decode(&json!("CLOSE_POPUP")),
            Err(BridgeError::NotAnObject)
        );
        assert_eq!(
            BoundaryMessage::decode(&json!({"kind": "CLOSE_POPUP"})),
            Err(BridgeError::MissingType)
        );
        assert!(matches!(
            BoundaryMessage::decode(&json!({"type": "AI_REPLY_SETTINGS", "settings": {"tone": "loud"}})),
            Err(BridgeError::Malformed { .. })
        ));
    }
}
