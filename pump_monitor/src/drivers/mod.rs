//! Telemetry driver implementations.
//!
//! A [`TelemetryDriver`] advances the telemetry of one pump by one monitoring
//! tick. The monitor only sees the trait object, so a driver reading real
//! field instruments could replace the simulation without touching the loop.
//!
//! - [`simulation`] - Random-walk simulation for development and demos
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement [`TelemetryDriver`]
//! 3. Construct it in [`crate::station::Station::build`]

pub mod simulation;

use chrono::{DateTime, Utc};
use pump::pump::{MetricKind, Pump};

/// Source of per-tick telemetry.
///
/// `advance` runs while the fleet write lock is held and must not block.
pub trait TelemetryDriver: Send {
    /// Driver name.
    fn name(&self) -> &'static str;

    /// Driver version.
    fn version(&self) -> &'static str;

    /// Advance `pump`'s metrics by one tick and stamp `updated_at`.
    ///
    /// On return every metric must lie within its clamp range, rounded to
    /// the channel's precision.
    fn advance(&mut self, pump: &mut Pump, now: DateTime<Utc>);
}

/// Clamp every metric into its range and round it to its precision.
pub fn clamp_and_round(pump: &mut Pump) {
    for kind in MetricKind::ALL {
        let (lo, hi) = kind.bounds();
        let value = pump.metrics.get_mut(kind);
        *value = round_to(value.clamp(lo, hi), kind.decimals());
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
