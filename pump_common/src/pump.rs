//! Pump entity types.
//!
//! A [`Pump`] carries its fixed identity, operating status, the emergency
//! stop latch, six telemetry metrics, the thresholds they are judged
//! against and the alert list derived on the latest tick.
//!
//! Latch invariant: `status == EmergencyStop` implies `emergency_stop`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alert::Alert;
use crate::consts::{
    EFFICIENCY_RANGE, FLOW_RATE_RANGE, POWER_RANGE, PRESSURE_RANGE, TEMPERATURE_RANGE,
    VIBRATION_RANGE,
};

/// Numeric pump identifier, fixed at creation.
pub type PumpId = u32;

/// Operating status of a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PumpStatus {
    /// Pumping; telemetry drifts randomly.
    Running,
    /// Stopped by an operator; telemetry decays.
    #[default]
    Stopped,
    /// Ready to start; telemetry is held.
    Standby,
    /// Stopped by an emergency command; the latch is set.
    EmergencyStop,
    /// Under maintenance; telemetry is forced to idle values.
    Maintenance,
}

impl PumpStatus {
    /// Wire name of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Standby => "standby",
            Self::EmergencyStop => "emergency_stop",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for PumpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one of the six telemetry channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Discharge pressure [bar].
    Pressure,
    /// Casing temperature [°C].
    Temperature,
    /// Flow rate [L/min].
    FlowRate,
    /// Vibration velocity [mm/s].
    Vibration,
    /// Power draw [% of rated].
    Power,
    /// Hydraulic efficiency [%].
    Efficiency,
}

impl MetricKind {
    /// All channels in canonical order.
    pub const ALL: [MetricKind; 6] = [
        Self::Pressure,
        Self::Temperature,
        Self::FlowRate,
        Self::Vibration,
        Self::Power,
        Self::Efficiency,
    ];

    /// Inclusive clamp bounds `(min, max)` applied every tick.
    pub const fn bounds(&self) -> (f64, f64) {
        let range = match self {
            Self::Pressure => PRESSURE_RANGE,
            Self::Temperature => TEMPERATURE_RANGE,
            Self::FlowRate => FLOW_RATE_RANGE,
            Self::Vibration => VIBRATION_RANGE,
            Self::Power => POWER_RANGE,
            Self::Efficiency => EFFICIENCY_RANGE,
        };
        (*range.start(), *range.end())
    }

    /// Number of decimal places a reading is rounded to.
    pub const fn decimals(&self) -> i32 {
        match self {
            Self::Vibration => 2,
            _ => 1,
        }
    }

    /// Engineering unit suffix.
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Pressure => "bar",
            Self::Temperature => "°C",
            Self::FlowRate => "L/min",
            Self::Vibration => "mm/s",
            Self::Power | Self::Efficiency => "%",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::FlowRate => "flow_rate",
            Self::Vibration => "vibration",
            Self::Power => "power",
            Self::Efficiency => "efficiency",
        };
        f.write_str(name)
    }
}

/// Current telemetry of a pump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Metrics {
    /// Discharge pressure [bar].
    pub pressure: f64,
    /// Casing temperature [°C].
    pub temperature: f64,
    /// Flow rate [L/min].
    pub flow_rate: f64,
    /// Vibration velocity [mm/s].
    pub vibration: f64,
    /// Power draw [%].
    pub power: f64,
    /// Hydraulic efficiency [%].
    pub efficiency: f64,
}

impl Metrics {
    /// Read a single channel.
    pub const fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Pressure => self.pressure,
            MetricKind::Temperature => self.temperature,
            MetricKind::FlowRate => self.flow_rate,
            MetricKind::Vibration => self.vibration,
            MetricKind::Power => self.power,
            MetricKind::Efficiency => self.efficiency,
        }
    }

    /// Mutable access to a single channel.
    pub fn get_mut(&mut self, kind: MetricKind) -> &mut f64 {
        match kind {
            MetricKind::Pressure => &mut self.pressure,
            MetricKind::Temperature => &mut self.temperature,
            MetricKind::FlowRate => &mut self.flow_rate,
            MetricKind::Vibration => &mut self.vibration,
            MetricKind::Power => &mut self.power,
            MetricKind::Efficiency => &mut self.efficiency,
        }
    }

    /// Iterate `(kind, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, f64)> + '_ {
        MetricKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// First channel holding NaN or an infinity, if any.
    pub fn first_non_finite(&self) -> Option<MetricKind> {
        self.iter().find(|(_, v)| !v.is_finite()).map(|(k, _)| k)
    }

    /// Whether every channel lies within its clamp bounds.
    pub fn within_bounds(&self) -> bool {
        self.iter().all(|(kind, v)| {
            let (lo, hi) = kind.bounds();
            (lo..=hi).contains(&v)
        })
    }
}

/// Alerting bounds of a pump. Fixed at creation.
///
/// Missing fields deserialize to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Pressure below this raises `pressure_low`.
    pub pressure_min: f64,
    /// Pressure above this raises `pressure_high`.
    pub pressure_max: f64,
    /// Temperature above this raises `temperature_high`.
    pub temperature_max: f64,
    /// Flow below this while running raises `flow_low`.
    pub flow_rate_min: f64,
    /// Vibration above this raises `vibration_high`.
    pub vibration_max: f64,
    /// Efficiency below this while running raises `efficiency_low`.
    pub efficiency_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pressure_min: 50.0,
            pressure_max: 80.0,
            temperature_max: 90.0,
            flow_rate_min: 180.0,
            vibration_max: 2.0,
            efficiency_min: 85.0,
        }
    }
}

impl Thresholds {
    /// Check that the bounds are finite, non-negative and ordered.
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("pressure_min", self.pressure_min),
            ("pressure_max", self.pressure_max),
            ("temperature_max", self.temperature_max),
            ("flow_rate_min", self.flow_rate_min),
            ("vibration_max", self.vibration_max),
            ("efficiency_min", self.efficiency_min),
        ];
        for (name, value) in values {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if self.pressure_min >= self.pressure_max {
            return Err(format!(
                "pressure_min ({}) must be below pressure_max ({})",
                self.pressure_min, self.pressure_max
            ));
        }
        Ok(())
    }
}

/// A pump and its full live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pump {
    /// Identifier.
    pub id: PumpId,
    /// Display name.
    pub name: String,
    /// Pump construction type (centrifugal, rotary, ...).
    #[serde(rename = "type")]
    pub pump_type: String,
    /// Installation site.
    pub location: String,
    /// Operating status.
    pub status: PumpStatus,
    /// Automatic mode flag, independent of `status`.
    pub auto_mode: bool,
    /// Emergency stop latch.
    pub emergency_stop: bool,
    /// Current telemetry.
    pub metrics: Metrics,
    /// Alerting bounds.
    pub thresholds: Thresholds,
    /// Alerts derived on the latest tick.
    pub alerts: Vec<Alert>,
    /// Last completed maintenance.
    pub last_maintenance: DateTime<Utc>,
    /// Next scheduled maintenance.
    pub next_maintenance: DateTime<Utc>,
    /// Accumulated runtime [h].
    pub total_runtime: u32,
    /// Production since midnight [barrels].
    pub production_today: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl Pump {
    /// Create a stopped pump with zeroed telemetry and default thresholds.
    pub fn new(
        id: PumpId,
        name: impl Into<String>,
        pump_type: impl Into<String>,
        location: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            pump_type: pump_type.into(),
            location: location.into(),
            status: PumpStatus::Stopped,
            auto_mode: true,
            emergency_stop: false,
            metrics: Metrics::default(),
            thresholds: Thresholds::default(),
            alerts: Vec::new(),
            last_maintenance: now,
            next_maintenance: now,
            total_runtime: 0,
            production_today: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the initial status. An emergency stop status also sets the latch.
    pub fn with_status(mut self, status: PumpStatus) -> Self {
        self.status = status;
        if status == PumpStatus::EmergencyStop {
            self.emergency_stop = true;
        }
        self
    }

    /// Set the initial telemetry.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the alerting bounds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the automatic mode flag.
    pub fn with_auto_mode(mut self, auto_mode: bool) -> Self {
        self.auto_mode = auto_mode;
        self
    }

    /// Whether the pump is currently running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.status == PumpStatus::Running
    }

    /// Whether the latch invariant holds.
    pub fn latch_consistent(&self) -> bool {
        self.status != PumpStatus::EmergencyStop || self.emergency_stop
    }
}
