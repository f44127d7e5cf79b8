//! # Pump Monitor Binary
//!
//! Runs the monitoring loop over a simulated pump fleet and logs every
//! published event until Ctrl+C.
//!
//! # Usage
//!
//! ```bash
//! # Built-in six-pump fleet, 5 s ticks
//! pump_monitor
//!
//! # Station file with a reproducible run
//! pump_monitor --config config/station.toml --seed 42
//!
//! # Verbose JSON logs
//! pump_monitor -v --json
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use pump::activity::ActivityCategory;
use pump::config::{ConfigError, LogLevel, StationConfig};
use pump::event::FleetEvent;
use pump_monitor::{EventBus, Station};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Pump Monitor - fleet telemetry simulation, alerting and health scoring
#[derive(Parser, Debug)]
#[command(name = "pump_monitor")]
#[command(version)]
#[command(about = "Pump fleet telemetry simulation, threshold alerting and health scoring")]
#[command(long_about = None)]
struct Args {
    /// Path to the station configuration (station.toml).
    /// The built-in fleet and defaults are used when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the simulation, overriding `monitor.seed`
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Pump monitor startup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let loaded = load_config(&args);
    let log_level = loaded
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);
    let mut config = loaded?;

    if args.seed.is_some() {
        config.monitor.seed = args.seed;
    }

    info!(
        "{} v{} starting (seed={:?})",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        config.monitor.seed
    );

    let bus = Arc::new(EventBus::new(config.monitor.event_capacity));
    let logger = tokio::spawn(log_events(bus.subscribe()));

    let station = Station::build(&config, bus.clone());
    let handle = station.monitor.handle();
    info!(
        "Fleet ready: {} pumps, tick every {}ms",
        station.registry.len(),
        config.monitor.base_period_ms
    );
    station.activity.append(
        "Monitoring started",
        &config.shared.service_name,
        ActivityCategory::Info,
        None,
    );

    let mut monitor = tokio::spawn(station.monitor.run());

    tokio::select! {
        result = &mut monitor => {
            if let Err(e) = result {
                error!("Monitor task ended unexpectedly: {}", e);
            }
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received shutdown signal (Ctrl+C)"),
                Err(e) => error!("Unable to listen for shutdown signal: {}", e),
            }
        }
    }

    monitor.abort();
    bus.close();
    logger.abort();

    let stats = handle.stats();
    let fleet = handle.fleet_stats();
    info!("Final state:");
    info!(
        "  - Health: {} ({})",
        fleet.system_health.score, fleet.system_health.status
    );
    info!(
        "  - Pumps: {} running, {} stopped, {} maintenance",
        fleet.running_pumps, fleet.stopped_pumps, fleet.maintenance_pumps
    );
    info!("  - Active alerts: {}", fleet.active_alerts);
    info!(
        "  - Ticks: {} ({} failed), avg={}us, max={}us",
        stats.tick_count,
        stats.failed_ticks,
        stats.avg_tick_time_us(),
        stats.max_tick_time_us
    );
    info!("Pump monitor shutdown complete");
    Ok(())
}

/// Load the station file, or defaults when no file was given.
fn load_config(args: &Args) -> Result<StationConfig, ConfigError> {
    match &args.config {
        Some(path) => StationConfig::load_validated(path),
        None => Ok(StationConfig::default()),
    }
}

/// Log every event the bus carries. Stands in for a transport adapter.
async fn log_events(mut rx: tokio::sync::broadcast::Receiver<FleetEvent>) {
    loop {
        match rx.recv().await {
            Ok(FleetEvent::NewAlert(raised)) => info!(
                "[{:?}] {}: {}",
                raised.alert.severity, raised.pump_name, raised.alert.description
            ),
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => debug!("{} ({} bytes)", event.name(), json.len()),
                Err(e) => warn!("Failed to serialize {}: {}", event.name(), e),
            },
            Err(RecvError::Lagged(skipped)) => warn!("Event log lagged, skipped {}", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive: Directive = if args.verbose {
        tracing::Level::DEBUG.into()
    } else {
        level
            .as_directive()
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into())
    };

    let filter = EnvFilter::from_default_env().add_directive(directive);

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
