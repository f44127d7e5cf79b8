//! Simulation driver module.
//!
//! Random-walk telemetry for running without field instruments. One seeded
//! generator drives both the initial fleet and every later tick, so a fixed
//! seed reproduces a whole run.

mod driver;
mod seed;

pub use driver::SimulationDriver;
pub use seed::{initial_metrics, seed_fleet};

/// Name reported by the simulation driver.
pub const DRIVER_NAME: &str = "simulation";
