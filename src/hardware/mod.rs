//! Panel Hardware
//!
//! Traits for the three kinds of device the bridge talks to, plus the
//! backends that provide them.
//!
//! ## Backends
//!
//! - **rpi** (feature `rpi`): Raspberry Pi GPIO, software PWM and I2C via `rppal`
//! - **sim**: in-memory devices driven through a [`SimHandle`]
//!
//! Devices are opened individually. One that fails to open is logged and
//! left out of the [`Hardware`] bundle so the rest of the panel keeps working.

pub mod ads1115;
mod error;
#[cfg(feature = "rpi")]
pub mod rpi;
pub mod sim;

pub use ads1115::Ads1115;
pub use error::{HardwareError, HardwareResult};
pub use sim::{simulated, SimHandle};

use crate::panel::InputId;
use serde::Serialize;

/// A pulled-up, active-low digital input
pub trait DigitalInput: Send {
    /// True while the button is pressed or the switch is on
    fn is_active(&mut self) -> HardwareResult<bool>;
}

/// A dimmable LED
pub trait LedOutput: Send {
    /// Set brightness in `0.0..=1.0`
    fn set_brightness(&mut self, level: f64) -> HardwareResult<()>;
}

/// A single ADC channel
pub trait AnalogInput: Send {
    /// Signed 16-bit conversion result
    fn read_raw(&mut self) -> HardwareResult<i16>;
}

/// Everything that came up when the hardware was opened
pub struct Hardware {
    pub backend: &'static str,
    pub inputs: Vec<(InputId, Box<dyn DigitalInput>)>,
    pub led: Option<Box<dyn LedOutput>>,
    pub adc: Option<Box<dyn AnalogInput>>,
}

/// Which devices are present, reported by the health endpoint
#[derive(Debug, Clone, Default, Serialize)]
pub struct HardwareStatus {
    pub backend: String,
    pub inputs: Vec<InputId>,
    pub led: bool,
    pub adc: bool,
    /// Whether the ADC was asked for at all
    pub adc_enabled: bool,
}

impl Hardware {
    pub fn status(&self) -> HardwareStatus {
        HardwareStatus {
            backend: self.backend.to_string(),
            inputs: self.inputs.iter().map(|(id, _)| *id).collect(),
            led: self.led.is_some(),
            adc: self.adc.is_some(),
            adc_enabled: self.adc.is_some(),
        }
    }
}

impl HardwareStatus {
    pub fn any_present(&self) -> bool {
        !self.inputs.is_empty() || self.led || self.adc
    }

    /// Every input, the LED and (when enabled) the ADC came up
    pub fn is_complete(&self) -> bool {
        self.inputs.len() == InputId::ALL.len() && self.led && (self.adc || !self.adc_enabled)
    }
}

/// Logs devices that fail to open while the panel comes up
///
/// The busy-pin hint is logged for the first busy failure only; when the
/// GPIO controller is held by another process every pin fails the same way.
#[derive(Debug, Default)]
pub struct OpenFailures {
    count: usize,
    busy_hint_shown: bool,
}

impl OpenFailures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log one failure; returns true when the busy hint was logged with it
    pub fn record(&mut self, device: &str, pin: Option<u8>, error: &HardwareError) -> bool {
        self.count += 1;
        match pin {
            Some(pin) => tracing::error!(device, pin, error = %error, "Failed to initialize device"),
            None => tracing::error!(device, error = %error, "Failed to initialize device"),
        }

        if !error.is_busy() || self.busy_hint_shown {
            return false;
        }
        self.busy_hint_shown = true;
        tracing::error!("  The pin is already in use. Another process may be holding it.");
        tracing::error!("  Try: sudo fuser /dev/gpiochip*  or stop other GPIO services.");
        true
    }

    /// Number of devices that failed
    pub fn count(&self) -> usize {
        self.count
    }
}
