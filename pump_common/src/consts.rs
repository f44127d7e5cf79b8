//! Fleet-wide constants.
//!
//! Single source of truth for metric clamp ranges, scheduling defaults and
//! buffer capacities. Imported by all crates.

use std::ops::RangeInclusive;

/// Pressure clamp range [bar].
pub const PRESSURE_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Temperature clamp range [°C]. The lower bound doubles as ambient.
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 20.0..=120.0;

/// Flow rate clamp range [L/min].
pub const FLOW_RATE_RANGE: RangeInclusive<f64> = 0.0..=500.0;

/// Vibration clamp range [mm/s].
pub const VIBRATION_RANGE: RangeInclusive<f64> = 0.0..=5.0;

/// Power clamp range [%].
pub const POWER_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Efficiency clamp range [%].
pub const EFFICIENCY_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Ambient temperature a stopped pump cools towards [°C].
pub const AMBIENT_TEMPERATURE: f64 = 20.0;

/// Default monitoring tick period in milliseconds (5 s).
pub const DEFAULT_BASE_PERIOD_MS: u64 = 5_000;

/// Multiplier applied to the base period while the loop is degraded.
pub const DEGRADED_PERIOD_FACTOR: u32 = 2;

/// Default activity log capacity; oldest entries are evicted beyond this.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 500;

/// Default broadcast buffer capacity of the event bus.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Number of pumps in the built-in fleet.
pub const DEFAULT_FLEET_SIZE: usize = 6;

/// Default service name when no configuration is supplied.
pub const DEFAULT_SERVICE_NAME: &str = "pump-monitor";

/// Actor recorded when a command carries no operator identity.
pub const UNKNOWN_ACTOR: &str = "unspecified";
