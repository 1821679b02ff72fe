//! Photo Portal GPIO diagnostic
//!
//! Logs the initial state of every panel input and each debounced change
//! until Ctrl+C. Use this to check that the buttons and switches are wired
//! correctly before running the bridge.
//!
//! Run with: cargo run --features rpi --bin portal-diag

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};

use portal_bridge::api::shutdown_signal;
use portal_bridge::bridge::{InputMonitor, MonitorSettings};
use portal_bridge::config::PinConfig;
use portal_bridge::hardware::{simulated, Hardware};
use portal_bridge::logging::init_tracing;
use portal_bridge::{Config, InputId};

#[derive(Parser)]
#[command(name = "portal-diag")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Monitor the Photo Portal panel inputs and print every change")]
struct Cli {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use simulated hardware instead of the GPIO pins
    #[arg(long)]
    simulate: bool,
}

const RULE: &str = "======================================================================";

fn describe(input: InputId, pins: &PinConfig, active: bool) -> String {
    let state = if active { "PRESSED/ON" } else { "RELEASED/OFF" };
    let kind = if input.kind().is_momentary() {
        "button"
    } else {
        "switch"
    };
    format!(
        "{} (GPIO {:2}) [{}] -> {}",
        input.label(),
        input.pin(pins),
        kind,
        state
    )
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_default(),
    };
    config.validate()?;
    init_tracing(&config.logging);

    println!("{}", RULE);
    println!("Photo Portal GPIO Diagnostic Tool");
    println!("{}", RULE);
    println!("\nInitializing GPIO inputs...");
    println!("All inputs configured with pull-up resistors (active LOW)\n");

    let hardware = open_hardware(&config, cli.simulate);
    let settings = MonitorSettings::from(&config.inputs);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut monitors = Vec::new();
    for (id, device) in hardware.inputs {
        match InputMonitor::new(id, device, settings) {
            Ok(monitor) => {
                let input = monitor.input();
                println!(
                    "[{}] {} (initial state)",
                    timestamp(),
                    describe(input, &config.pins, monitor.level())
                );
                let task = tokio::spawn(monitor.run(events_tx.clone(), shutdown_rx.clone()));
                monitors.push((input, task));
            }
            Err(e) => println!(
                "ERROR: Failed to initialize {} on GPIO {}: {}",
                id.label(),
                id.pin(&config.pins),
                e
            ),
        }
    }
    drop(events_tx);

    println!("\n{}", RULE);
    println!("Monitoring GPIO inputs... (Press Ctrl+C to exit)");
    println!("{}\n", RULE);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(transition) = events_rx.recv() => {
                println!(
                    "[{}] {}",
                    timestamp(),
                    describe(transition.input, &config.pins, transition.active)
                );
            }
            _ = &mut shutdown => break,
            else => break,
        }
    }

    println!("\n\n{}", RULE);
    println!("Shutting down...");
    println!("{}", RULE);

    let _ = shutdown_tx.send(true);
    for (id, task) in monitors {
        match task.await {
            Ok(()) => println!("Closed {} (GPIO {})", id.label(), id.pin(&config.pins)),
            Err(e) => println!("Error closing {}: {}", id.label(), e),
        }
    }

    println!("\nDiagnostic script terminated.");
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
