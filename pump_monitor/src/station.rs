//! Component wiring.
//!
//! [`Station::build`] turns a validated [`StationConfig`] into the running
//! set of components sharing one registry and one event sink.

use std::sync::Arc;

use chrono::Utc;
use pump::config::StationConfig;
use pump::event::EventSink;
use tracing::info;

use crate::activity::ActivityLog;
use crate::control::ControlHandler;
use crate::drivers::simulation::{SimulationDriver, seed_fleet};
use crate::monitor::Monitor;
use crate::registry::PumpRegistry;
use crate::sessions::{Sessions, StaticAuthProvider};

/// Every component of one monitored station.
pub struct Station {
    /// Fleet state.
    pub registry: Arc<PumpRegistry>,
    /// Activity ring buffer.
    pub activity: Arc<ActivityLog>,
    /// Online operators.
    pub sessions: Arc<Sessions>,
    /// Command entry point for request workers.
    pub control: ControlHandler,
    /// The loop, not yet started.
    pub monitor: Monitor,
}

impl Station {
    /// Seed the fleet and wire the components to `sink`.
    ///
    /// `config.monitor.seed` makes the whole run reproducible.
    pub fn build(config: &StationConfig, sink: Arc<dyn EventSink>) -> Self {
        let mut driver = match config.monitor.seed {
            Some(seed) => SimulationDriver::seeded(seed),
            None => SimulationDriver::new(),
        };
        let fleet = seed_fleet(&config.fleet_specs(), driver.rng(), Utc::now());
        let registry = Arc::new(PumpRegistry::new(fleet));

        let activity = Arc::new(ActivityLog::new(
            config.monitor.activity_capacity,
            Arc::clone(&sink),
        ));
        let provider = StaticAuthProvider::new(&config.operators);
        info!("{} operators may log in", provider.len());
        let sessions = Arc::new(Sessions::new(
            Box::new(provider),
            Arc::clone(&activity),
            Arc::clone(&sink),
        ));
        let control = ControlHandler::new(
            Arc::clone(&registry),
            Arc::clone(&activity),
            Arc::clone(&sink),
        );
        let monitor = Monitor::new(
            Arc::clone(&registry),
            Box::new(driver),
            Arc::clone(&sessions),
            sink,
            config.monitor.base_period(),
        );

        Self {
            registry,
            activity,
            sessions,
            control,
            monitor,
        }
    }
}
