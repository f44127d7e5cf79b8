//! Simulation driver implementation.
//!
//! Per-tick rules by status:
//!
//! | Status | Effect |
//! |---|---|
//! | running | every metric drifts by a small random step, production accrues |
//! | stopped, emergency_stop | pressure and temperature decay, the rest drop to zero |
//! | maintenance | everything zero except a low random temperature |
//! | standby | held |
//!
//! Clamping and rounding apply after every status.

use chrono::{DateTime, Utc};
use pump::consts::AMBIENT_TEMPERATURE;
use pump::pump::{Pump, PumpStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::DRIVER_NAME;
use crate::drivers::{TelemetryDriver, clamp_and_round};

/// Simulation driver implementing the TelemetryDriver trait.
#[derive(Debug)]
pub struct SimulationDriver {
    /// Random source for drift and decay
    rng: StdRng,
}

impl SimulationDriver {
    /// Create a driver seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a deterministic driver.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Random source, shared with fleet seeding.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    fn drift(&mut self, pump: &mut Pump) {
        let rng = &mut self.rng;
        let m = &mut pump.metrics;
        m.pressure += rng.random_range(-2.0..=2.0);
        m.temperature += rng.random_range(-1.0..=3.0);
        m.flow_rate += rng.random_range(-10.0..=10.0);
        m.vibration += rng.random_range(-0.1..=0.2);
        m.power += rng.random_range(-2.0..=2.0);
        m.efficiency += rng.random_range(-1.0..=1.0);
        pump.production_today += rng.random_range(1.0..=5.0);
    }

    fn decay(&mut self, pump: &mut Pump) {
        let rng = &mut self.rng;
        let m = &mut pump.metrics;
        m.pressure = (m.pressure - rng.random_range(5.0..=10.0)).max(0.0);
        m.temperature = (m.temperature - rng.random_range(2.0..=5.0)).max(AMBIENT_TEMPERATURE);
        m.flow_rate = 0.0;
        m.vibration = 0.0;
        m.power = 0.0;
        m.efficiency = 0.0;
    }

    fn idle(&mut self, pump: &mut Pump) {
        let m = &mut pump.metrics;
        m.pressure = 0.0;
        m.temperature = self.rng.random_range(20.0..=30.0);
        m.flow_rate = 0.0;
        m.vibration = 0.0;
        m.power = 0.0;
        m.efficiency = 0.0;
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn advance(&mut self, pump: &mut Pump, now: DateTime<Utc>) {
        match pump.status {
            PumpStatus::Running => self.drift(pump),
            PumpStatus::Stopped | PumpStatus::EmergencyStop => self.decay(pump),
            PumpStatus::Maintenance => self.idle(pump),
            PumpStatus::Standby => {}
        }
        clamp_and_round(pump);
        pump.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pump::pump::Metrics;

    fn pump(status: PumpStatus) -> Pump {
        Pump::new(1, "Oil Pump 1", "centrifugal", "north sector", Utc::now())
            .with_status(status)
            .with_metrics(Metrics {
                pressure: 65.0,
                temperature: 75.0,
                flow_rate: 250.0,
                vibration: 1.2,
                power: 85.0,
                efficiency: 92.0,
            })
    }

    #[test]
    fn running_drift_stays_near_previous_values() {
        let mut driver = SimulationDriver::seeded(7);
        let mut p = pump(PumpStatus::Running);
        let before = p.metrics;
        let production = p.production_today;
        driver.advance(&mut p, Utc::now());

        let m = p.metrics;
        assert!((m.pressure - before.pressure).abs() <= 2.05);
        assert!(m.temperature >= before.temperature - 1.05);
        assert!(m.temperature <= before.temperature + 3.05);
        assert!((m.flow_rate - before.flow_rate).abs() <= 10.05);
        assert!(p.production_today >= production + 1.0);
        assert!(p.production_today <= production + 5.0);
    }

    #[test]
    fn stopped_pump_decays() {
        let mut driver = SimulationDriver::seeded(7);
        let mut p = pump(PumpStatus::Stopped);
        driver.advance(&mut p, Utc::now());

        let m = p.metrics;
        assert!(m.pressure <= 60.0 && m.pressure >= 55.0);
        assert!(m.temperature <= 73.0 && m.temperature >= 70.0);
        assert_eq!(m.flow_rate, 0.0);
        assert_eq!(m.vibration, 0.0);
        assert_eq!(m.power, 0.0);
        assert_eq!(m.efficiency, 0.0);
    }

    #[test]
    fn emergency_stopped_pump_cools_to_ambient() {
        let mut driver = SimulationDriver::seeded(11);
        let mut p = pump(PumpStatus::EmergencyStop);
        for _ in 0..50 {
            driver.advance(&mut p, Utc::now());
        }
        assert_eq!(p.metrics.pressure, 0.0);
        assert_eq!(p.metrics.temperature, AMBIENT_TEMPERATURE);
        assert!(p.emergency_stop);
    }

    #[test]
    fn maintenance_idles_with_low_temperature() {
        let mut driver = SimulationDriver::seeded(3);
        let mut p = pump(PumpStatus::Maintenance);
        driver.advance(&mut p, Utc::now());

        let m = p.metrics;
        assert_eq!(m.pressure, 0.0);
        assert!((20.0..=30.0).contains(&m.temperature));
        assert_eq!(m.flow_rate + m.vibration + m.power + m.efficiency, 0.0);
    }

    #[test]
    fn standby_holds_metrics() {
        let mut driver = SimulationDriver::seeded(3);
        let mut p = pump(PumpStatus::Standby);
        let before = p.metrics;
        driver.advance(&mut p, Utc::now());
        assert_eq!(p.metrics, before);
    }

    #[test]
    fn standby_still_clamps() {
        let mut driver = SimulationDriver::seeded(3);
        let mut p = pump(PumpStatus::Standby);
        p.metrics.pressure = 180.0;
        driver.advance(&mut p, Utc::now());
        assert_eq!(p.metrics.pressure, 100.0);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let mut a = SimulationDriver::seeded(42);
        let mut b = SimulationDriver::seeded(42);
        let mut pa = pump(PumpStatus::Running);
        let mut pb = pa.clone();
        let now = Utc::now();
        for _ in 0..20 {
            a.advance(&mut pa, now);
            b.advance(&mut pb, now);
        }
        assert_eq!(pa, pb);
    }

    #[test]
    fn advance_stamps_updated_at() {
        let mut driver = SimulationDriver::seeded(1);
        let mut p = pump(PumpStatus::Running);
        let later = p.updated_at + chrono::Duration::seconds(5);
        driver.advance(&mut p, later);
        assert_eq!(p.updated_at, later);
    }
}
