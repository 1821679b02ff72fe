//! Photo Portal GPIO bridge
//!
//! Run with: cargo run --features rpi --bin portal-bridge
//!
//! Without the `rpi` feature, or with `--simulate`, the panel is simulated
//! so the webapp can be developed off-device.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use portal_bridge::config::generate_default_config;
use portal_bridge::hardware::{simulated, Hardware};
use portal_bridge::logging::init_tracing;
use portal_bridge::{serve, AppState, Bridge, Config};

#[derive(Parser)]
#[command(name = "portal-bridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bridges the Photo Portal panel hardware to the webapp over WebSocket")]
struct Cli {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use simulated hardware instead of the GPIO pins
    #[arg(long)]
    simulate: bool,

    /// Override the WebSocket port
    #[arg(short, long)]
    port: Option<u16>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    init_tracing(&config.logging);
    tracing::info!("Photo Portal GPIO bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let hardware = open_hardware(&config, cli.simulate);
    let bridge = Bridge::start(hardware, &config).await;

    let result = serve(AppState::new(&bridge), &config.server).await;

    bridge.shutdown().await;
    result.context("WebSocket server failed")?;

    tracing::info!("Photo Portal GPIO bridge stopped");
    Ok(())
}

#[cfg(feature = "rpi")]
fn open_hardware(config: &Config, simulate: bool) -> Hardware {
    if simulate {
        simulated(config).0
    } else {
        portal_bridge::hardware::rpi::open(config)
    }
}

#[cfg(not(feature = "rpi"))]
fn open_hardware(config: &Config, simulate: bool) -> Hardware {
    if !simulate {
        tracing::warn!("Built without the `rpi` feature, using simulated hardware");
    }
    simulated(config).0
}
