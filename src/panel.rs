//! Panel Layout
//!
//! The fixed set of digital inputs on the portal's front panel and how each
//! one behaves on the wire.

use crate::config::PinConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four digital inputs on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputId {
    LikeButton,
    MapToggle,
    MetadataToggle,
    MessageButton,
}

/// How an input's transitions are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Momentary push button; only presses are reported
    Button,
    /// Latching switch whose position is reported as ON/OFF
    Switch,
    /// Switch reported as a bare toggle each time it turns on
    Toggle,
}

/// Position of a latching switch as reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub fn from_active(active: bool) -> Self {
        if active {
            SwitchState::On
        } else {
            SwitchState::Off
        }
    }
}

impl InputId {
    pub const ALL: [InputId; 4] = [
        InputId::LikeButton,
        InputId::MapToggle,
        InputId::MetadataToggle,
        InputId::MessageButton,
    ];

    /// Event type used on the WebSocket
    pub fn wire_name(self) -> &'static str {
        match self {
            InputId::LikeButton => "LIKE_BUTTON",
            InputId::MapToggle => "MAP_TOGGLE",
            InputId::MetadataToggle => "METADATA_TOGGLE",
            InputId::MessageButton => "MESSAGE_BUTTON",
        }
    }

    /// Human-readable name for diagnostics
    pub fn label(self) -> &'static str {
        match self {
            InputId::LikeButton => "Like Button",
            InputId::MapToggle => "Map Toggle",
            InputId::MetadataToggle => "Metadata Toggle",
            InputId::MessageButton => "Message Button",
        }
    }

    pub fn kind(self) -> InputKind {
        match self {
            InputId::LikeButton | InputId::MessageButton => InputKind::Button,
            InputId::MapToggle => InputKind::Switch,
            InputId::MetadataToggle => InputKind::Toggle,
        }
    }

    /// BCM pin this input is wired to
    pub fn pin(self, pins: &PinConfig) -> u8 {
        match self {
            InputId::LikeButton => pins.like_button,
            InputId::MapToggle => pins.map_toggle,
            InputId::MetadataToggle => pins.metadata_toggle,
            InputId::MessageButton => pins.message_button,
        }
    }
}

impl InputKind {
    pub fn is_momentary(self) -> bool {
        matches!(self, InputKind::Button)
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pin_mapping() {
        let pins = PinConfig::default();
        assert_eq!(InputId::LikeButton.pin(&pins), 18);
        assert_eq!(InputId::MapToggle.pin(&pins), 27);
        assert_eq!(InputId::MetadataToggle.pin(&pins), 22);
        assert_eq!(InputId::MessageButton.pin(&pins), 23);
    }

    #[test]
    fn test_kinds() {
        assert!(InputId::LikeButton.kind().is_momentary());
        assert!(InputId::MessageButton.kind().is_momentary());
        assert_eq!(InputId::MapToggle.kind(), InputKind::Switch);
        assert_eq!(InputId::MetadataToggle.kind(), InputKind::Toggle);
    }

    #[test]
    fn test_switch_state_wire_format() {
        assert_eq!(serde_json::to_string(&SwitchState::On).unwrap(), "\"ON\"");
        assert_eq!(SwitchState::from_active(false), SwitchState::Off);
    }

    #[test]
    fn test_serializes_as_wire_name() {
        for id in InputId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.wire_name()));
        }
    }
}
