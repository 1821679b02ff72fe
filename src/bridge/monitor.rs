//! Input Monitor
//!
//! Polls one digital input, debounces it and reports level changes.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

use super::debounce::Debouncer;
use crate::config::InputsConfig;
use crate::hardware::{DigitalInput, HardwareResult};
use crate::panel::InputId;

/// A debounced level change on one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTransition {
    pub input: InputId,
    /// True when the input became pressed/on
    pub active: bool,
}

/// Sampling settings shared by all monitors
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub debounce: Duration,
}

impl From<&InputsConfig> for MonitorSettings {
    fn from(config: &InputsConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            debounce: config.debounce(),
        }
    }
}

pub struct InputMonitor {
    input: InputId,
    device: Box<dyn DigitalInput>,
    debouncer: Debouncer,
    poll_interval: Duration,
}

impl InputMonitor {
    /// Take an initial reading; the monitor reports changes from there on
    pub fn new(
        input: InputId,
        mut device: Box<dyn DigitalInput>,
        settings: MonitorSettings,
    ) -> HardwareResult<Self> {
        let initial = device.is_active()?;
        Ok(Self {
            input,
            device,
            debouncer: Debouncer::new(initial, settings.debounce),
            poll_interval: settings.poll_interval,
        })
    }

    pub fn input(&self) -> InputId {
        self.input
    }

    /// Current debounced level
    pub fn level(&self) -> bool {
        self.debouncer.stable()
    }

    /// Poll until shutdown or until the receiving side goes away
    pub async fn run(
        mut self,
        events: mpsc::UnboundedSender<InputTransition>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut failing = false;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            let raw = match self.device.is_active() {
                Ok(raw) => {
                    if failing {
                        tracing::info!(input = %self.input, "Input readable again");
                        failing = false;
                    }
                    raw
                }
                Err(e) => {
                    if !failing {
                        tracing::warn!(input = %self.input, error = %e, "Error reading input");
                        failing = true;
                    }
                    continue;
                }
            };

            if let Some(active) = self.debouncer.update(raw, Instant::now()) {
                let transition = InputTransition {
                    input: self.input,
                    active,
                };
                if events.send(transition).is_err() {
                    break;
                }
            }
        }

        tracing::debug!(input = %self.input, "Input monitor stopped");
    }
}
