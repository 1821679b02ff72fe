//! WebSocket Message Types
//!
//! JSON frames exchanged with the photo portal webapp. Every frame is an
//! object whose `type` field names the event.

use serde::{Deserialize, Serialize};

use crate::bridge::LedCommand;
use crate::panel::SwitchState;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Switch or dim the LED
    #[serde(rename = "LED")]
    Led { value: LedCommand },
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Like button pressed
    LikeButton,
    /// Message button pressed
    MessageButton,
    /// Metadata overlay switch turned on
    MetadataToggle,
    /// Map view switch position
    MapToggle { value: SwitchState },
    /// Zoom dial position, 0.0 to 1.0
    ZoomDial { value: f64 },
    /// A client frame could not be handled
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Event type as it appears in the `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::LikeButton => "LIKE_BUTTON",
            ServerMessage::MessageButton => "MESSAGE_BUTTON",
            ServerMessage::MetadataToggle => "METADATA_TOGGLE",
            ServerMessage::MapToggle { .. } => "MAP_TOGGLE",
            ServerMessage::ZoomDial { .. } => "ZOOM_DIAL",
            ServerMessage::Error { .. } => "ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialize_led_word() {
        let json = r#"{"type": "LED", "value": "ON"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Led { value } => assert_eq!(value, LedCommand::Word("ON".into())),
        }
    }

    #[test]
    fn test_client_message_deserialize_led_level() {
        let json = r#"{"type": "LED", "value": 0.25}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Led { value } => assert_eq!(value, LedCommand::Level(0.25)),
        }
    }

    #[test]
    fn test_client_message_rejects_unknown_type() {
        let json = r#"{"type": "BUZZER", "value": "ON"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());

        let json = r#"{"type": "LED"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize_button() {
        let json = serde_json::to_string(&ServerMessage::LikeButton).unwrap();
        assert_eq!(json, r#"{"type":"LIKE_BUTTON"}"#);
        let json = serde_json::to_string(&ServerMessage::MetadataToggle).unwrap();
        assert_eq!(json, r#"{"type":"METADATA_TOGGLE"}"#);
    }

    #[test]
    fn test_server_message_serialize_map_toggle() {
        let msg = ServerMessage::MapToggle {
            value: SwitchState::Off,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"MAP_TOGGLE","value":"OFF"}"#);
    }

    #[test]
    fn test_server_message_serialize_zoom() {
        let json = serde_json::to_string(&ServerMessage::ZoomDial { value: 0.5 }).unwrap();
        assert_eq!(json, r#"{"type":"ZOOM_DIAL","value":0.5}"#);
    }

    #[test]
    fn test_kind_matches_serialized_type() {
        let messages = [
            ServerMessage::LikeButton,
            ServerMessage::MessageButton,
            ServerMessage::MetadataToggle,
            ServerMessage::MapToggle {
                value: SwitchState::On,
            },
            ServerMessage::ZoomDial { value: 0.1 },
            ServerMessage::error("bad"),
        ];
        for msg in messages {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], msg.kind());
        }
    }
}
