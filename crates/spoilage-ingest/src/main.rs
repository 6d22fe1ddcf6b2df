//! Spoilage Ingest - Serial reader for the sensor board.
//!
//! Run with: `cargo run -p spoilage-ingest -- --port /dev/ttyUSB0`

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use spoilage_core::serial::{LoopExit, open_port};
use spoilage_ingest::config::default_config_path;
use spoilage_ingest::{ConsoleSink, ForwardClient, ForwardSink, IngestConfig, LineSink, ingest};

/// Spoilage Ingest - Read sensor lines from a serial port.
#[derive(Parser, Debug)]
#[command(name = "spoilage-ingest")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device (overrides config).
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (overrides config).
    #[arg(short, long)]
    baud_rate: Option<u32>,

    /// Service URL to forward readings to (overrides config).
    #[arg(short, long)]
    forward: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spoilage_ingest=info".parse()?)
                .add_directive("spoilage_core=info".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => IngestConfig::load(path)?,
        None => IngestConfig::load_or_default(default_config_path()),
    };

    // Override config with CLI args
    if let Some(port) = args.port {
        config.serial.port = port;
    }
    if let Some(baud_rate) = args.baud_rate {
        config.serial.baud_rate = baud_rate;
    }
    if let Some(url) = args.forward {
        config.forward.url = Some(url);
    }
    config.validate()?;

    let mut sinks: Vec<Box<dyn LineSink>> = vec![Box::new(ConsoleSink)];
    if let Some(url) = &config.forward.url {
        let client = ForwardClient::new(url).context("invalid forward URL")?;
        info!("Forwarding readings to {}", client.base_url());
        sinks.push(Box::new(ForwardSink::new(client)));
    }

    let port = match open_port(&config.serial.settings()) {
        Ok(port) => port,
        Err(e) => {
            error!("Could not connect to the serial port: {}", e);
            return Err(e).context("check the port name and that the board is plugged in");
        }
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_cancel.cancel(),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    // The board resets when the port opens.
    tokio::select! {
        _ = tokio::time::sleep(config.serial.reset_delay()) => {}
        _ = cancel.cancelled() => {}
    }
    info!("Connected, reading sensor data");

    let result = ingest(port, cancel, sinks).await;
    info!("Serial connection closed");

    let summary = result?;
    match summary.exit {
        LoopExit::Cancelled => println!("Stopped by user"),
        LoopExit::EndOfStream => info!("Serial stream ended after {} lines", summary.lines),
        LoopExit::ConsumerClosed => warn!("Line consumer stopped early"),
    }

    Ok(())
}
