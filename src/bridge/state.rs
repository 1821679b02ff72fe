//! Portal State
//!
//! Last known level of every input, the zoom dial and the LED. New clients
//! are primed from here; the health endpoint reports it.

use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::panel::{InputId, SwitchState};
use crate::websocket::ServerMessage;

/// Point-in-time copy of the portal state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateSnapshot {
    /// Debounced level per present input (true = pressed/on)
    pub inputs: BTreeMap<InputId, bool>,
    /// Map switch position, once known
    pub map_toggle: Option<SwitchState>,
    /// Normalized dial position, when the ADC is present
    pub zoom: Option<f64>,
    pub led_brightness: f64,
}

impl StateSnapshot {
    /// Messages that bring a newly connected client up to date
    ///
    /// Momentary buttons carry no state and the metadata switch is reported
    /// as bare toggles, so only the map switch and the dial are replayed.
    pub fn connect_messages(&self) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        if let Some(value) = self.map_toggle {
            messages.push(ServerMessage::MapToggle { value });
        }
        if let Some(value) = self.zoom {
            messages.push(ServerMessage::ZoomDial { value });
        }
        messages
    }
}

pub struct PortalState {
    inner: RwLock<StateSnapshot>,
}

impl PortalState {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StateSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        self.inner.read().await.clone()
    }

    /// Record a debounced input level, tracking the map switch position
    pub async fn record_input(&self, input: InputId, active: bool) {
        let mut state = self.inner.write().await;
        state.inputs.insert(input, active);
        if input == InputId::MapToggle {
            state.map_toggle = Some(SwitchState::from_active(active));
        }
    }

    pub async fn set_zoom(&self, value: f64) {
        self.inner.write().await.zoom = Some(value);
    }

    pub async fn set_led(&self, level: f64) {
        self.inner.write().await.led_brightness = level;
    }
}

impl Default for PortalState {
    fn default() -> Self {
        Self::new()
    }
}
