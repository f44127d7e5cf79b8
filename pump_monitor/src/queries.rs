//! Read-only fleet queries.

use pump::alert::FleetAlert;
use pump::health::HealthSnapshot;
use pump::pump::{Pump, PumpStatus};
use serde::{Deserialize, Serialize};

use crate::drivers::round_to;

/// Fleet-wide counters for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetStats {
    /// Registered pumps.
    pub total_pumps: usize,
    /// Pumps running.
    pub running_pumps: usize,
    /// Pumps stopped, normally or by emergency.
    pub stopped_pumps: usize,
    /// Pumps under maintenance.
    pub maintenance_pumps: usize,
    /// Production since midnight across the fleet.
    pub total_production: f64,
    /// Mean efficiency over every pump, running or not.
    pub avg_efficiency: f64,
    /// Alerts across the fleet.
    pub active_alerts: usize,
    /// Operators logged in.
    pub users_online: usize,
    /// Latest health snapshot.
    pub system_health: HealthSnapshot,
}

impl FleetStats {
    /// Summarize `pumps`.
    pub fn collect(pumps: &[Pump], system_health: HealthSnapshot, users_online: usize) -> Self {
        let count = |status: PumpStatus| pumps.iter().filter(|p| p.status == status).count();
        let avg_efficiency = if pumps.is_empty() {
            0.0
        } else {
            pumps.iter().map(|p| p.metrics.efficiency).sum::<f64>() / pumps.len() as f64
        };

        Self {
            total_pumps: pumps.len(),
            running_pumps: count(PumpStatus::Running),
            stopped_pumps: count(PumpStatus::Stopped) + count(PumpStatus::EmergencyStop),
            maintenance_pumps: count(PumpStatus::Maintenance),
            total_production: round_to(pumps.iter().map(|p| p.production_today).sum(), 1),
            avg_efficiency: round_to(avg_efficiency, 1),
            active_alerts: pumps.iter().map(|p| p.alerts.len()).sum(),
            users_online,
            system_health,
        }
    }
}

/// Every alert in the fleet, critical first, newest first within a severity.
pub fn fleet_alerts(pumps: &[Pump]) -> Vec<FleetAlert> {
    let mut alerts: Vec<FleetAlert> = pumps
        .iter()
        .flat_map(|pump| {
            pump.alerts.iter().map(|alert| FleetAlert {
                pump_id: pump.id,
                pump_name: pump.name.clone(),
                alert: alert.clone(),
            })
        })
        .collect();
    alerts.sort_by(|a, b| {
        a.alert
            .severity
            .rank()
            .cmp(&b.alert.severity.rank())
            .then_with(|| b.alert.timestamp.cmp(&a.alert.timestamp))
    });
    alerts
}
