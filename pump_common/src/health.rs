//! Fleet health snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Health category derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Score >= 90.
    Excellent,
    /// Score >= 80.
    Good,
    /// Score >= 70.
    Acceptable,
    /// Score >= 50.
    Poor,
    /// Score < 50.
    Critical,
}

impl HealthStatus {
    /// Bucket a 0-100 score.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 80.0 {
            Self::Good
        } else if score >= 70.0 {
            Self::Acceptable
        } else if score >= 50.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Acceptable => "acceptable",
            Self::Poor => "poor",
            Self::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Per-factor breakdown behind a score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct HealthFactors {
    /// Running pumps as a percentage of the fleet.
    pub pump_availability: f64,
    /// Mean efficiency of running pumps [%].
    pub avg_efficiency: f64,
    /// Alerts across the fleet.
    pub active_alerts: usize,
    /// Critical alerts across the fleet.
    pub critical_alerts: usize,
    /// Pumps in emergency stop.
    pub emergency_pumps: usize,
}

/// Fleet health at one instant. Recomputed wholesale each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Composite score in [0, 100].
    pub score: f64,
    /// Category of the score.
    pub status: HealthStatus,
    /// Breakdown.
    pub factors: HealthFactors,
    /// Computation time.
    pub last_update: DateTime<Utc>,
}

impl HealthSnapshot {
    /// Placeholder published before the first tick has run.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            score: 95.0,
            status: HealthStatus::Excellent,
            factors: HealthFactors::default(),
            last_update: now,
        }
    }
}
