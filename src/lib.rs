//! # Portal Bridge
//!
//! Hardware bridge for the Photo Portal. Reads the front panel of a
//! Raspberry Pi (two buttons, two switches, a zoom potentiometer on an
//! ADS1115) and streams state changes to the browser webapp over a local
//! WebSocket, which in turn can switch and dim the panel LED.
//!
//! ## Modules
//!
//! - [`hardware`]: Device traits with Raspberry Pi and simulated backends
//! - [`bridge`]: Debounced input monitors, zoom sampler, LED control, shared state
//! - [`websocket`]: Connection hub and message formats
//! - [`api`]: Axum server with the WebSocket and health routes
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portal_bridge::{AppState, Bridge, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let (hardware, sim) = portal_bridge::hardware::simulated(&config);
//!     let bridge = Bridge::start(hardware, &config).await;
//!
//!     // Flip the map switch; connected clients receive MAP_TOGGLE ON
//!     sim.set_active(portal_bridge::InputId::MapToggle, true);
//!
//!     portal_bridge::serve(AppState::new(&bridge), &config.server).await?;
//!     bridge.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bridge;
pub mod config;
pub mod hardware;
pub mod logging;
pub mod panel;
pub mod websocket;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};

pub use bridge::{
    Bridge, InputTransition, LedCommand, LedController, LedError, PortalState, StateSnapshot,
};

pub use config::{Config, ConfigError, LoggingConfig};

pub use hardware::{
    AnalogInput, DigitalInput, Hardware, HardwareError, HardwareStatus, LedOutput, SimHandle,
};

pub use panel::{InputId, InputKind, SwitchState};

pub use websocket::{ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage};
