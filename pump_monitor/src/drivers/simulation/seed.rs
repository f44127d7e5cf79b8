//! Randomized startup state for a simulated fleet.

use chrono::{DateTime, Duration, Utc};
use pump::config::PumpSpec;
use pump::pump::{Metrics, Pump, PumpId};
use rand::Rng;

use crate::drivers::{clamp_and_round, round_to};

/// Draw startup telemetry for a healthy running pump.
pub fn initial_metrics(rng: &mut impl Rng) -> Metrics {
    Metrics {
        pressure: rng.random_range(45.0..=85.0),
        temperature: rng.random_range(65.0..=95.0),
        flow_rate: rng.random_range(150.0..=300.0),
        vibration: rng.random_range(0.5..=2.5),
        power: rng.random_range(75.0..=95.0),
        efficiency: rng.random_range(85.0..=98.0),
    }
}

/// Build the startup fleet. Ids are assigned 1..=n in configuration order.
pub fn seed_fleet(specs: &[PumpSpec], rng: &mut impl Rng, now: DateTime<Utc>) -> Vec<Pump> {
    specs
        .iter()
        .zip(1..)
        .map(|(spec, id)| seed_pump(spec, id, &mut *rng, now))
        .collect()
}

fn seed_pump(spec: &PumpSpec, id: PumpId, rng: &mut impl Rng, now: DateTime<Utc>) -> Pump {
    let mut pump = Pump::new(id, &spec.name, &spec.pump_type, &spec.location, now)
        .with_status(spec.status)
        .with_auto_mode(spec.auto_mode)
        .with_thresholds(spec.thresholds)
        .with_metrics(initial_metrics(rng));
    clamp_and_round(&mut pump);

    pump.last_maintenance = now - Duration::days(rng.random_range(10..=90));
    pump.next_maintenance = now + Duration::days(rng.random_range(30..=120));
    pump.total_runtime = rng.random_range(5_000..=15_000);
    pump.production_today = round_to(rng.random_range(1_000.0..=5_000.0), 1);
    pump
}
