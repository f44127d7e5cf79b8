//! Fleet health scoring.
//!
//! Four weighted factors, each contributing only when it applies:
//!
//! | Factor | Weight | Points | Included |
//! |---|---|---|---|
//! | availability | 30 | running / total * 30 | fleet not empty |
//! | efficiency | 25 | mean running efficiency / 100 * 25 | any pump running |
//! | alerts | 20 | 20 - min(2 * active + 5 * critical, 20) | fleet not empty |
//! | stability | 25 | max(0, 25 - 10 * emergency) | fleet not empty |
//!
//! The score is points over included weight, scaled to 100. An empty fleet
//! scores 50.

use chrono::{DateTime, Utc};
use pump::alert::Severity;
use pump::health::{HealthFactors, HealthSnapshot, HealthStatus};
use pump::pump::{Pump, PumpStatus};

use crate::drivers::round_to;

const AVAILABILITY_WEIGHT: f64 = 30.0;
const EFFICIENCY_WEIGHT: f64 = 25.0;
const ALERT_WEIGHT: f64 = 20.0;
const STABILITY_WEIGHT: f64 = 25.0;

const ALERT_PENALTY: f64 = 2.0;
const CRITICAL_PENALTY: f64 = 5.0;
const EMERGENCY_PENALTY: f64 = 10.0;

/// Score reported for a fleet with no pumps.
pub const EMPTY_FLEET_SCORE: f64 = 50.0;

/// Compute the fleet health snapshot.
pub fn score(pumps: &[Pump], now: DateTime<Utc>) -> HealthSnapshot {
    let total = pumps.len();
    let running: Vec<&Pump> = pumps.iter().filter(|p| p.is_running()).collect();
    let active_alerts: usize = pumps.iter().map(|p| p.alerts.len()).sum();
    let critical_alerts = pumps
        .iter()
        .flat_map(|p| &p.alerts)
        .filter(|a| a.severity == Severity::Critical)
        .count();
    let emergency_pumps = pumps
        .iter()
        .filter(|p| p.status == PumpStatus::EmergencyStop)
        .count();

    let avg_efficiency = if running.is_empty() {
        None
    } else {
        Some(running.iter().map(|p| p.metrics.efficiency).sum::<f64>() / running.len() as f64)
    };

    let score = if total == 0 {
        EMPTY_FLEET_SCORE
    } else {
        let mut points = 0.0;
        let mut weight = 0.0;

        points += running.len() as f64 / total as f64 * AVAILABILITY_WEIGHT;
        weight += AVAILABILITY_WEIGHT;

        if let Some(avg) = avg_efficiency {
            points += avg / 100.0 * EFFICIENCY_WEIGHT;
            weight += EFFICIENCY_WEIGHT;
        }

        let penalty = (active_alerts as f64 * ALERT_PENALTY
            + critical_alerts as f64 * CRITICAL_PENALTY)
            .min(ALERT_WEIGHT);
        points += ALERT_WEIGHT - penalty;
        weight += ALERT_WEIGHT;

        points += (STABILITY_WEIGHT - emergency_pumps as f64 * EMERGENCY_PENALTY).max(0.0);
        weight += STABILITY_WEIGHT;

        (points / weight * 100.0).clamp(0.0, 100.0)
    };
    let score = round_to(score, 1);

    let pump_availability = if total == 0 {
        0.0
    } else {
        round_to(running.len() as f64 / total as f64 * 100.0, 1)
    };

    HealthSnapshot {
        score,
        status: HealthStatus::from_score(score),
        factors: HealthFactors {
            pump_availability,
            avg_efficiency: avg_efficiency.map_or(0.0, |avg| round_to(avg, 1)),
            active_alerts,
            critical_alerts,
            emergency_pumps,
        },
        last_update: now,
    }
}
