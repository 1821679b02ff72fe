//! Simulated panel
//!
//! In-memory stand-ins for the panel devices. The [`SimHandle`] returned by
//! [`simulated`] flips inputs, moves the dial and observes the LED.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI16, Ordering};
use std::sync::{Arc, Mutex};

use super::{AnalogInput, DigitalInput, Hardware, HardwareError, HardwareResult, LedOutput};
use crate::config::Config;
use crate::panel::InputId;

/// Shared controls for a simulated panel
#[derive(Clone)]
pub struct SimHandle {
    inputs: Arc<HashMap<InputId, Arc<AtomicBool>>>,
    led: Arc<Mutex<f64>>,
    adc_raw: Arc<AtomicI16>,
    adc_fail: Arc<AtomicBool>,
}

impl SimHandle {
    /// Press/release a button or flip a switch
    pub fn set_active(&self, input: InputId, active: bool) {
        if let Some(level) = self.inputs.get(&input) {
            level.store(active, Ordering::SeqCst);
        }
    }

    pub fn is_active(&self, input: InputId) -> bool {
        self.inputs
            .get(&input)
            .map(|level| level.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    pub fn set_adc_raw(&self, raw: i16) {
        self.adc_raw.store(raw, Ordering::SeqCst);
    }

    /// Make subsequent ADC reads fail until cleared
    pub fn set_adc_failing(&self, failing: bool) {
        self.adc_fail.store(failing, Ordering::SeqCst);
    }

    pub fn led_brightness(&self) -> f64 {
        self.led.lock().map(|level| *level).unwrap_or(0.0)
    }
}

struct SimInput {
    level: Arc<AtomicBool>,
}

impl DigitalInput for SimInput {
    fn is_active(&mut self) -> HardwareResult<bool> {
        Ok(self.level.load(Ordering::SeqCst))
    }
}

struct SimLed {
    level: Arc<Mutex<f64>>,
}

impl LedOutput for SimLed {
    fn set_brightness(&mut self, level: f64) -> HardwareResult<()> {
        if !(0.0..=1.0).contains(&level) {
            return Err(HardwareError::InvalidValue(format!(
                "brightness must be within 0.0-1.0, got {}",
                level
            )));
        }
        let mut current = self
            .level
            .lock()
            .map_err(|_| HardwareError::Unavailable("simulated LED poisoned".to_string()))?;
        *current = level;
        Ok(())
    }
}

struct SimAdc {
    raw: Arc<AtomicI16>,
    fail: Arc<AtomicBool>,
}

impl AnalogInput for SimAdc {
    fn read_raw(&mut self) -> HardwareResult<i16> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(HardwareError::I2c("simulated read failure".to_string()));
        }
        Ok(self.raw.load(Ordering::SeqCst))
    }
}

/// Build a fully populated simulated panel
///
/// All inputs start released, the dial at zero and the LED off. The ADC is
/// left out when it is disabled in the config, as on real hardware.
pub fn simulated(config: &Config) -> (Hardware, SimHandle) {
    let levels: HashMap<InputId, Arc<AtomicBool>> = InputId::ALL
        .iter()
        .map(|id| (*id, Arc::new(AtomicBool::new(false))))
        .collect();

    let handle = SimHandle {
        inputs: Arc::new(levels),
        led: Arc::new(Mutex::new(0.0)),
        adc_raw: Arc::new(AtomicI16::new(0)),
        adc_fail: Arc::new(AtomicBool::new(false)),
    };

    let inputs = InputId::ALL
        .iter()
        .filter_map(|id| {
            handle.inputs.get(id).map(|level| {
                let input: Box<dyn DigitalInput> = Box::new(SimInput {
                    level: Arc::clone(level),
                });
                (*id, input)
            })
        })
        .collect();

    let adc: Option<Box<dyn AnalogInput>> = if config.adc.enabled {
        Some(Box::new(SimAdc {
            raw: Arc::clone(&handle.adc_raw),
            fail: Arc::clone(&handle.adc_fail),
        }))
    } else {
        None
    };

    let hardware = Hardware {
        backend: "simulated",
        inputs,
        led: Some(Box::new(SimLed {
            level: Arc::clone(&handle.led),
        })),
        adc,
    };

    tracing::info!("Simulated panel initialized");
    (hardware, handle)
}
