//! Zoom Dial Sampler
//!
//! Reads the potentiometer through the ADC at a fixed rate and reports the
//! position whenever it has moved by at least the change threshold since
//! the last report.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::state::PortalState;
use crate::config::AdcConfig;
use crate::hardware::AnalogInput;
use crate::websocket::{ConnectionHub, ServerMessage};

/// Full-scale positive reading of a 16-bit single-ended conversion
const FULL_SCALE: f64 = 32767.0;

/// Map a raw conversion onto `0.0..=1.0`
///
/// Single-ended readings can dip slightly below zero from offset noise;
/// those clamp to 0.
pub fn normalize(raw: i16) -> f64 {
    (f64::from(raw) / FULL_SCALE).clamp(0.0, 1.0)
}

/// Threshold filter over normalized dial positions
#[derive(Debug, Clone)]
pub struct ZoomTracker {
    threshold: f64,
    last: f64,
}

impl ZoomTracker {
    pub fn new(initial: f64, threshold: f64) -> Self {
        Self {
            threshold,
            last: initial,
        }
    }

    /// Last reported position
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Returns the value when it should be reported
    pub fn observe(&mut self, value: f64) -> Option<f64> {
        if (value - self.last).abs() >= self.threshold {
            self.last = value;
            Some(value)
        } else {
            None
        }
    }
}

pub struct ZoomSampler {
    adc: Box<dyn AnalogInput>,
    tracker: ZoomTracker,
    interval: Duration,
}

impl ZoomSampler {
    /// Take the initial reading, which becomes the first reported value
    pub fn new(mut adc: Box<dyn AnalogInput>, config: &AdcConfig) -> Self {
        let initial = match adc.read_raw() {
            Ok(raw) => {
                let value = normalize(raw);
                tracing::info!(value = %format!("{:.3}", value), raw, "ADC initial value");
                value
            }
            Err(e) => {
                tracing::warn!(error = %e, "Initial ADC read failed, starting from 0.0");
                0.0
            }
        };

        Self {
            adc,
            tracker: ZoomTracker::new(initial, config.change_threshold),
            interval: config.poll_interval(),
        }
    }

    pub fn value(&self) -> f64 {
        self.tracker.last()
    }

    /// Sample until shutdown, publishing `ZOOM_DIAL` on every reported change
    pub async fn run(
        mut self,
        state: Arc<PortalState>,
        hub: Arc<ConnectionHub>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            let raw = match self.adc.read_raw() {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!(error = %e, "Error reading ADC");
                    continue;
                }
            };

            let previous = self.tracker.last();
            if let Some(value) = self.tracker.observe(normalize(raw)) {
                tracing::info!(
                    value = %format!("{:.3}", value),
                    change = %format!("{:.3}", (value - previous).abs()),
                    raw,
                    "ADC change detected"
                );
                state.set_zoom(value).await;
                hub.publish(ServerMessage::ZoomDial { value });
            }
        }

        tracing::debug!("Zoom sampler stopped");
    }
}
