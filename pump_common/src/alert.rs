//! Alert types.
//!
//! Alerts are re-derived from metrics and thresholds on every tick and carry
//! no identity beyond the synthetic `"{type}_{pump_id}"` id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pump::PumpId;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Requires immediate action.
    Critical,
    /// Out-of-band condition worth attention.
    Warning,
    /// Informational.
    Info,
}

impl Severity {
    /// Sort rank, most severe first.
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Warning => 1,
            Self::Info => 2,
        }
    }
}

/// Kind of threshold violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Pressure under `pressure_min`.
    PressureLow,
    /// Pressure over `pressure_max`.
    PressureHigh,
    /// Temperature over `temperature_max`.
    TemperatureHigh,
    /// Running with flow under `flow_rate_min`.
    FlowLow,
    /// Vibration over `vibration_max`.
    VibrationHigh,
    /// Running with efficiency under `efficiency_min`.
    EfficiencyLow,
}

impl AlertKind {
    /// Wire name of the kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PressureLow => "pressure_low",
            Self::PressureHigh => "pressure_high",
            Self::TemperatureHigh => "temperature_high",
            Self::FlowLow => "flow_low",
            Self::VibrationHigh => "vibration_high",
            Self::EfficiencyLow => "efficiency_low",
        }
    }

    /// Fixed severity of the kind.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::PressureHigh | Self::TemperatureHigh => Severity::Critical,
            Self::PressureLow | Self::FlowLow | Self::VibrationHigh => Severity::Warning,
            Self::EfficiencyLow => Severity::Info,
        }
    }

    /// Synthetic alert id for a pump.
    pub fn alert_id(&self, pump_id: PumpId) -> String {
        format!("{}_{}", self.as_str(), pump_id)
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One active alert on one pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Synthetic id, `"{type}_{pump_id}"`.
    pub id: String,
    /// Violation kind.
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Severity of the kind.
    pub severity: Severity,
    /// Short headline naming the pump.
    pub message: String,
    /// Value and threshold that triggered the alert.
    pub description: String,
    /// Probable cause.
    pub cause: String,
    /// Illustrative image reference.
    pub image: String,
    /// Suggested operator actions.
    pub recommendations: Vec<String>,
    /// Evaluation time.
    pub timestamp: DateTime<Utc>,
}

/// An alert tagged with the pump it belongs to, for fleet-wide listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetAlert {
    /// Owning pump.
    pub pump_id: PumpId,
    /// Owning pump's name.
    pub pump_name: String,
    /// The alert itself.
    #[serde(flatten)]
    pub alert: Alert,
}
