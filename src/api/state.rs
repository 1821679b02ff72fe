//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::bridge::{Bridge, LedController, PortalState};
use crate::hardware::HardwareStatus;
use crate::websocket::ConnectionHub;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// WebSocket connection hub
    pub hub: Arc<ConnectionHub>,
    /// Last known panel state
    pub portal: Arc<PortalState>,
    /// LED driven by client commands
    pub led: Arc<LedController>,
    /// Devices that came up at startup
    pub hardware: HardwareStatus,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(bridge: &Bridge) -> Self {
        Self {
            hub: bridge.hub(),
            portal: bridge.state(),
            led: bridge.led(),
            hardware: bridge.status().clone(),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.hub.connection_count().await
    }
}
