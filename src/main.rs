//! Sprayer Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PinBank (OutputPort)  LogEventSink (EventSink)                │
//! │  LineTransport (ParamTransport) ──▶ param pump ──▶ queue       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ModeController (command loop)               │    │
//! │  │  OutputBank · cancellation domain · runners            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};

use sprayer::adapters::gpio;
use sprayer::adapters::line_transport::LineTransport;
use sprayer::adapters::log_sink::LogEventSink;
use sprayer::app::service::ModeController;
use sprayer::config::SprayerConfig;
use sprayer::params::decode::Limits;
use sprayer::params::pump::spawn_pump;
use sprayer::params::queue::CommandQueue;
use sprayer::params::table;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Sprayer v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SprayerConfig::default();
    config.validate().context("invalid configuration")?;
    info!(
        "Device '{}' ({}), {} channels, tick {}ms, broker {}",
        config.device_name,
        config.device_id,
        config.channel_count(),
        config.tick_ms,
        config.broker_host
    );

    // ── 3. Output lines ───────────────────────────────────────
    // Any line that fails to open aborts startup.
    let outputs = gpio::open_outputs(&config.output_gpios).context("opening output lines")?;

    // ── 4. Controller ─────────────────────────────────────────
    let sink = Arc::new(LogEventSink::new());
    let mut controller = ModeController::new(outputs, sink, &config);
    controller.start();

    // ── 5. Parameter transport ────────────────────────────────
    let params = table::catalogue(&config);
    for p in &params {
        debug!("PARAM | {} ({}) {:?}", p.id(), p.name, p.kind);
    }
    info!("{} parameters in {} nodes", params.len(), table::NODES.len());

    let queue = Arc::new(CommandQueue::new());
    let transport = LineTransport::new(std::io::BufReader::new(std::io::stdin()));
    let _pump = spawn_pump(transport, Arc::clone(&queue), Limits::from_config(&config))
        .context("starting parameter pump")?;

    info!("System ready. Entering command loop.");

    // ── 6. Command loop ───────────────────────────────────────
    controller.run(&queue);

    info!("Shutdown: all outputs LOW");
    Ok(())
}
