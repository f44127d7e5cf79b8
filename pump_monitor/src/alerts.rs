//! Threshold alert evaluation.
//!
//! Alerts are a pure function of a pump's metrics, thresholds and status.
//! Every tick replaces the previous list wholesale, so a cleared condition
//! never leaves a stale alert behind.
//!
//! Rule order is the canonical alert order:
//!
//! | # | Condition | Kind |
//! |---|---|---|
//! | 1 | pressure < pressure_min | pressure_low |
//! | 2 | otherwise pressure > pressure_max | pressure_high |
//! | 3 | temperature > temperature_max | temperature_high |
//! | 4 | running and flow_rate < flow_rate_min | flow_low |
//! | 5 | vibration > vibration_max | vibration_high |
//! | 6 | running and efficiency < efficiency_min | efficiency_low |

use chrono::{DateTime, Utc};
use pump::alert::{Alert, AlertKind};
use pump::pump::{MetricKind, Pump};

/// Derive the active alerts of `pump` at `now`.
pub fn evaluate(pump: &Pump, now: DateTime<Utc>) -> Vec<Alert> {
    let m = &pump.metrics;
    let t = &pump.thresholds;
    let running = pump.is_running();

    let mut alerts = Vec::new();
    let mut raise = |kind: AlertKind, value: f64, limit: f64| {
        alerts.push(build_alert(pump, kind, value, limit, now));
    };

    if m.pressure < t.pressure_min {
        raise(AlertKind::PressureLow, m.pressure, t.pressure_min);
    } else if m.pressure > t.pressure_max {
        raise(AlertKind::PressureHigh, m.pressure, t.pressure_max);
    }
    if m.temperature > t.temperature_max {
        raise(AlertKind::TemperatureHigh, m.temperature, t.temperature_max);
    }
    if running && m.flow_rate < t.flow_rate_min {
        raise(AlertKind::FlowLow, m.flow_rate, t.flow_rate_min);
    }
    if m.vibration > t.vibration_max {
        raise(AlertKind::VibrationHigh, m.vibration, t.vibration_max);
    }
    if running && m.efficiency < t.efficiency_min {
        raise(AlertKind::EfficiencyLow, m.efficiency, t.efficiency_min);
    }
    alerts
}

/// Fixed wording attached to each alert kind.
struct Template {
    metric: MetricKind,
    headline: &'static str,
    label: &'static str,
    comparison: &'static str,
    cause: &'static str,
    recommendations: [&'static str; 3],
}

fn template(kind: AlertKind) -> Template {
    match kind {
        AlertKind::PressureLow => Template {
            metric: MetricKind::Pressure,
            headline: "Low pressure",
            label: "Current pressure",
            comparison: "is below the minimum",
            cause: "Fluid shortage or blocked piping",
            recommendations: [
                "Check the fluid level in the tank",
                "Make sure the piping is not blocked",
                "Inspect the system valves",
            ],
        },
        AlertKind::PressureHigh => Template {
            metric: MetricKind::Pressure,
            headline: "High pressure",
            label: "Current pressure",
            comparison: "is above the maximum",
            cause: "Blocked discharge line or faulty relief valve",
            recommendations: [
                "Stop the pump immediately",
                "Inspect the relief valve",
                "Make sure the discharge line is not blocked",
            ],
        },
        AlertKind::TemperatureHigh => Template {
            metric: MetricKind::Temperature,
            headline: "High temperature",
            label: "Current temperature",
            comparison: "is above the maximum",
            cause: "Coolant shortage or cooling fan failure",
            recommendations: [
                "Inspect the cooling system",
                "Make sure the fan is running",
                "Check the coolant level",
            ],
        },
        AlertKind::FlowLow => Template {
            metric: MetricKind::FlowRate,
            headline: "Low flow rate",
            label: "Current flow rate",
            comparison: "is below the minimum",
            cause: "Clogged filters or worn internal parts",
            recommendations: [
                "Clean or replace the filters",
                "Inspect the pump internals",
                "Check for leaks",
            ],
        },
        AlertKind::VibrationHigh => Template {
            metric: MetricKind::Vibration,
            headline: "High vibration",
            label: "Current vibration level",
            comparison: "is above the maximum",
            cause: "Rotor imbalance or bearing wear",
            recommendations: [
                "Check the rotor balance",
                "Inspect the bearings",
                "Make sure the pump base is secure",
            ],
        },
        AlertKind::EfficiencyLow => Template {
            metric: MetricKind::Efficiency,
            headline: "Low efficiency",
            label: "Current efficiency",
            comparison: "is below the minimum",
            cause: "Internal wear or maintenance overdue",
            recommendations: [
                "Schedule routine maintenance",
                "Inspect the internal parts",
                "Review the operating conditions",
            ],
        },
    }
}

fn build_alert(pump: &Pump, kind: AlertKind, value: f64, limit: f64, now: DateTime<Utc>) -> Alert {
    let tpl = template(kind);
    let unit = tpl.metric.unit();
    Alert {
        id: kind.alert_id(pump.id),
        kind,
        severity: kind.severity(),
        message: format!("{} on {}", tpl.headline, pump.name),
        description: format!(
            "{} {value} {unit} {} {limit} {unit}",
            tpl.label, tpl.comparison
        ),
        cause: tpl.cause.to_string(),
        image: format!("/static/images/{kind}.png"),
        recommendations: tpl.recommendations.iter().map(|r| r.to_string()).collect(),
        timestamp: now,
    }
}
