//! Raspberry Pi backend
//!
//! Inputs are pulled up through the SoC and read active-low. The LED is
//! driven with software PWM since GPIO 17 has no hardware PWM channel. The
//! ADC sits on `/dev/i2c-1`.

use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::i2c::I2c;

use super::{
    Ads1115, AnalogInput, DigitalInput, Hardware, HardwareError, HardwareResult, LedOutput,
    OpenFailures,
};
use crate::config::Config;
use crate::panel::InputId;

struct PiInput {
    pin: InputPin,
}

impl DigitalInput for PiInput {
    fn is_active(&mut self) -> HardwareResult<bool> {
        Ok(self.pin.is_low())
    }
}

struct PiLed {
    pin: OutputPin,
    frequency: f64,
}

impl PiLed {
    fn gpio_error(&self, e: rppal::gpio::Error) -> HardwareError {
        HardwareError::Gpio {
            pin: self.pin.pin(),
            message: e.to_string(),
        }
    }
}

impl LedOutput for PiLed {
    fn set_brightness(&mut self, level: f64) -> HardwareResult<()> {
        if !(0.0..=1.0).contains(&level) {
            return Err(HardwareError::InvalidValue(format!(
                "brightness must be within 0.0-1.0, got {}",
                level
            )));
        }

        if level == 0.0 || level == 1.0 {
            self.pin.clear_pwm().map_err(|e| self.gpio_error(e))?;
            if level == 0.0 {
                self.pin.set_low();
            } else {
                self.pin.set_high();
            }
            return Ok(());
        }

        self.pin
            .set_pwm_frequency(self.frequency, level)
            .map_err(|e| self.gpio_error(e))
    }
}

fn gpio_error(pin: u8, e: rppal::gpio::Error) -> HardwareError {
    HardwareError::Gpio {
        pin,
        message: e.to_string(),
    }
}

fn open_adc(config: &Config) -> HardwareResult<Ads1115<I2c>> {
    let i2c = I2c::new().map_err(|e| HardwareError::I2c(e.to_string()))?;
    Ads1115::new(i2c, config.adc.i2c_address, config.adc.channel)
}

/// Open every panel device, skipping the ones that fail
pub fn open(config: &Config) -> Hardware {
    let mut hardware = Hardware {
        backend: "raspberry-pi",
        inputs: Vec::new(),
        led: None,
        adc: None,
    };
    let mut failures = OpenFailures::new();

    match Gpio::new() {
        Ok(gpio) => {
            let led_pin = config.pins.led;
            match gpio.get(led_pin) {
                Ok(pin) => {
                    let led: Box<dyn LedOutput> = Box::new(PiLed {
                        pin: pin.into_output_low(),
                        frequency: config.led.pwm_frequency_hz,
                    });
                    tracing::info!(pin = led_pin, "LED initialized with PWM");
                    hardware.led = Some(led);
                }
                Err(e) => {
                    failures.record("LED", Some(led_pin), &gpio_error(led_pin, e));
                }
            }

            for id in InputId::ALL {
                let pin = id.pin(&config.pins);
                match gpio.get(pin) {
                    Ok(p) => {
                        let input: Box<dyn DigitalInput> = Box::new(PiInput {
                            pin: p.into_input_pullup(),
                        });
                        tracing::info!(input = %id, pin, "Input initialized");
                        hardware.inputs.push((id, input));
                    }
                    Err(e) => {
                        failures.record(id.wire_name(), Some(pin), &gpio_error(pin, e));
                    }
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "GPIO controller unavailable");
            tracing::error!("  This must run on a Raspberry Pi with access to /dev/gpiomem.");
        }
    }

    if config.adc.enabled {
        match open_adc(config) {
            Ok(adc) => {
                tracing::info!(
                    address = %format!("{:#04x}", config.adc.i2c_address),
                    channel = config.adc.channel,
                    "ADC (ADS1115) initialized"
                );
                let adc: Box<dyn AnalogInput> = Box::new(adc);
                hardware.adc = Some(adc);
            }
            Err(e) => {
                failures.record("ADS1115", None, &e);
            }
        }
    } else {
        tracing::info!("ADC disabled by configuration");
    }

    if failures.count() > 0 {
        tracing::warn!(failed = failures.count(), "Some panel devices are unavailable");
    }
    hardware
}
