//! LED Control
//!
//! Turns client commands into PWM brightness. The LED starts off and is
//! switched off again when the bridge shuts down.

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use super::state::PortalState;
use crate::hardware::{HardwareError, LedOutput};

/// Value carried by an inbound `LED` command
///
/// `"ON"` and `"OFF"` (any case) switch the LED fully on or off; a number
/// sets brightness directly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LedCommand {
    Level(f64),
    Word(String),
}

impl LedCommand {
    /// Resolve to a brightness in `0.0..=1.0`
    pub fn brightness(&self) -> Result<f64, LedError> {
        match self {
            LedCommand::Level(level) if (0.0..=1.0).contains(level) => Ok(*level),
            LedCommand::Level(level) => Err(LedError::InvalidValue(level.to_string())),
            LedCommand::Word(word) => match word.to_uppercase().as_str() {
                "ON" => Ok(1.0),
                "OFF" => Ok(0.0),
                _ => Err(LedError::InvalidValue(word.clone())),
            },
        }
    }
}

/// Errors from LED commands
#[derive(Debug, Error)]
pub enum LedError {
    #[error("Invalid LED value: {0}")]
    InvalidValue(String),

    #[error("LED device not initialized")]
    Unavailable,

    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

/// Serializes access to the LED and mirrors its level into [`PortalState`]
pub struct LedController {
    output: Option<Mutex<Box<dyn LedOutput>>>,
    state: Arc<PortalState>,
}

impl LedController {
    pub fn new(output: Option<Box<dyn LedOutput>>, state: Arc<PortalState>) -> Self {
        Self {
            output: output.map(Mutex::new),
            state,
        }
    }

    pub fn is_present(&self) -> bool {
        self.output.is_some()
    }

    /// Apply a client command, returning the brightness that was set
    pub async fn apply(&self, command: &LedCommand) -> Result<f64, LedError> {
        let level = command.brightness().map_err(|e| {
            tracing::warn!(command = ?command, "Invalid LED value");
            e
        })?;
        self.set(level).await?;
        Ok(level)
    }

    pub async fn set(&self, level: f64) -> Result<(), LedError> {
        let output = self.output.as_ref().ok_or_else(|| {
            tracing::warn!("LED device not initialized");
            LedError::Unavailable
        })?;

        output.lock().await.set_brightness(level).map_err(|e| {
            tracing::error!(error = %e, "Error setting LED state");
            e
        })?;
        self.state.set_led(level).await;

        match level {
            l if l >= 1.0 => tracing::info!("LED turned ON"),
            l if l <= 0.0 => tracing::info!("LED turned OFF"),
            l => tracing::info!(brightness = l, "LED brightness set"),
        }
        Ok(())
    }

    /// Switch off, logging rather than failing
    pub async fn off(&self) {
        if !self.is_present() {
            return;
        }
        if let Err(e) = self.set(0.0).await {
            tracing::error!(error = %e, "Error switching LED off");
        }
    }
}
