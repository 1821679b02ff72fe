//! Data Transfer Objects
//!
//! Request and response bodies for the HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::bridge::{LedCommand, StateSnapshot};
use crate::hardware::HardwareStatus;

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy", "degraded" or "unhealthy"
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub connections: usize,
    pub hardware: HardwareStatus,
    pub state: StateSnapshot,
}

/// LED command over HTTP, same value forms as the WebSocket `LED` message
#[derive(Debug, Deserialize)]
pub struct LedRequest {
    pub value: LedCommand,
}

#[derive(Debug, Serialize)]
pub struct LedResponse {
    pub brightness: f64,
}
