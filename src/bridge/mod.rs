//! Hardware Bridge
//!
//! Wires the panel devices to the connection hub:
//!
//! - one [`InputMonitor`] task per digital input
//! - a dispatcher turning [`InputTransition`]s into client events
//! - a [`ZoomSampler`] task for the dial
//! - the [`LedController`] used by inbound commands
//!
//! State is updated before an event is published, so a client connecting
//! at any point sees a snapshot at least as new as the events it receives.

mod debounce;
mod led;
mod monitor;
mod state;
mod zoom;

pub use debounce::Debouncer;
pub use led::{LedCommand, LedController, LedError};
pub use monitor::{InputMonitor, InputTransition, MonitorSettings};
pub use state::{PortalState, StateSnapshot};
pub use zoom::{normalize, ZoomSampler, ZoomTracker};

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::hardware::{Hardware, HardwareStatus};
use crate::panel::{InputId, InputKind, SwitchState};
use crate::websocket::{ConnectionHub, HubConfig, ServerMessage};

/// Client event for a debounced transition, if the input reports one
pub fn event_for(transition: InputTransition) -> Option<ServerMessage> {
    let InputTransition { input, active } = transition;
    match input.kind() {
        InputKind::Button if active => Some(match input {
            InputId::LikeButton => ServerMessage::LikeButton,
            _ => ServerMessage::MessageButton,
        }),
        InputKind::Button => None,
        InputKind::Switch => Some(ServerMessage::MapToggle {
            value: SwitchState::from_active(active),
        }),
        InputKind::Toggle if active => Some(ServerMessage::MetadataToggle),
        InputKind::Toggle => None,
    }
}

/// Running bridge between the panel and connected clients
pub struct Bridge {
    state: Arc<PortalState>,
    hub: Arc<ConnectionHub>,
    led: Arc<LedController>,
    status: HardwareStatus,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl Bridge {
    /// Take ownership of the hardware and start all background tasks
    pub async fn start(hardware: Hardware, config: &Config) -> Self {
        let mut status = hardware.status();
        status.adc_enabled = config.adc.enabled;
        let Hardware {
            inputs, led, adc, ..
        } = hardware;

        let state = Arc::new(PortalState::new());
        let hub = Arc::new(ConnectionHub::new(HubConfig {
            max_connections: config.server.max_connections,
            ..HubConfig::default()
        }));
        let led = Arc::new(LedController::new(led, Arc::clone(&state)));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut tasks: Vec<JoinHandle<()>> = Arc::clone(&hub)
            .start_broadcast_worker(shutdown_rx.clone())
            .into_iter()
            .collect();

        let settings = MonitorSettings::from(&config.inputs);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        for (id, device) in inputs {
            match InputMonitor::new(id, device, settings) {
                Ok(monitor) => {
                    let level = monitor.level();
                    state.record_input(id, level).await;
                    match id.kind() {
                        InputKind::Switch => tracing::info!(
                            input = %id,
                            pin = id.pin(&config.pins),
                            state = ?SwitchState::from_active(level),
                            "Initial switch state"
                        ),
                        _ => tracing::info!(input = %id, pin = id.pin(&config.pins), "Input initialized"),
                    }
                    tasks.push(tokio::spawn(
                        monitor.run(events_tx.clone(), shutdown_rx.clone()),
                    ));
                }
                Err(e) => {
                    tracing::error!(input = %id, error = %e, "Initial read failed, input disabled");
                }
            }
        }
        // Dispatcher exits once every monitor has dropped its sender
        drop(events_tx);
        tasks.push(tokio::spawn(dispatch(
            events_rx,
            Arc::clone(&state),
            Arc::clone(&hub),
        )));

        if let Some(adc) = adc {
            let sampler = ZoomSampler::new(adc, &config.adc);
            state.set_zoom(sampler.value()).await;
            tasks.push(tokio::spawn(sampler.run(
                Arc::clone(&state),
                Arc::clone(&hub),
                shutdown_rx.clone(),
            )));
            tracing::info!("ADC reader started");
        } else {
            tracing::warn!("ADC not available, zoom dial disabled");
        }

        Self {
            state,
            hub,
            led,
            status,
            shutdown_tx,
            tasks,
        }
    }

    pub fn state(&self) -> Arc<PortalState> {
        Arc::clone(&self.state)
    }

    pub fn hub(&self) -> Arc<ConnectionHub> {
        Arc::clone(&self.hub)
    }

    pub fn led(&self) -> Arc<LedController> {
        Arc::clone(&self.led)
    }

    pub fn status(&self) -> &HardwareStatus {
        &self.status
    }

    /// Stop every task and switch the LED off
    pub async fn shutdown(self) {
        tracing::info!("Cleaning up resources...");
        let _ = self.shutdown_tx.send(true);

        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Bridge task failed");
            }
        }

        self.led.off().await;
        tracing::info!("Bridge stopped");
    }
}

/// Record transitions and forward the resulting events to the hub
async fn dispatch(
    mut events: mpsc::UnboundedReceiver<InputTransition>,
    state: Arc<PortalState>,
    hub: Arc<ConnectionHub>,
) {
    while let Some(transition) = events.recv().await {
        state
            .record_input(transition.input, transition.active)
            .await;

        match event_for(transition) {
            Some(message) => {
                match &message {
                    ServerMessage::MapToggle { value } => {
                        tracing::info!(input = %transition.input, state = ?value, "GPIO event")
                    }
                    _ => tracing::info!(input = %transition.input, "GPIO event triggered"),
                }
                hub.publish(message);
            }
            None => {
                tracing::debug!(input = %transition.input, active = transition.active, "Input deactivated");
            }
        }
    }
    tracing::debug!("Dispatcher stopped");
}
