//! Hardware error types

use thiserror::Error;

/// Errors raised while opening or talking to panel hardware
#[derive(Error, Debug)]
pub enum HardwareError {
    /// GPIO controller or pin failure
    #[error("GPIO error on pin {pin}: {message}")]
    Gpio { pin: u8, message: String },

    /// I2C bus failure
    #[error("I2C error: {0}")]
    I2c(String),

    /// Value outside what the device accepts
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Backend not compiled in or not present on this machine
    #[error("Hardware unavailable: {0}")]
    Unavailable(String),
}

impl HardwareError {
    /// Whether the failure looks like another process holding the pin
    pub fn is_busy(&self) -> bool {
        match self {
            HardwareError::Gpio { message, .. } => {
                let message = message.to_lowercase();
                message.contains("busy") || message.contains("in use")
            }
            _ => false,
        }
    }
}

/// Result type for hardware operations
pub type HardwareResult<T> = Result<T, HardwareError>;
