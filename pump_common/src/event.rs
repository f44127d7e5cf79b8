//! Outbound fleet events.
//!
//! [`FleetEvent`] is the typed contract between the monitoring core and
//! whatever transport delivers state to subscribers. The core hands events
//! to an [`EventSink`] and never knows how they travel further.
//!
//! Serialized form is adjacently tagged:
//!
//! ```json
//! { "event": "new_alert", "data": { "pump_id": 2, "pump_name": "...", "alert": { } } }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ActivityLogEntry;
use crate::alert::Alert;
use crate::auth::Operator;
use crate::health::HealthSnapshot;
use crate::pump::{Pump, PumpId};

/// Failure to hand an event to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The sink has shut down and accepts nothing further.
    #[error("event sink closed")]
    Closed,

    /// The sink refused this event.
    #[error("event rejected: {0}")]
    Rejected(String),
}

/// Receives events for delivery to transport subscribers.
///
/// `publish` must not block on I/O; it is called right after fleet locks
/// are released, from both the monitoring loop and request workers.
pub trait EventSink: Send + Sync {
    /// Hand one event to the sink.
    ///
    /// # Errors
    /// Returns [`SinkError`] if the event could not be accepted. Having no
    /// subscribers is not an error.
    fn publish(&self, event: FleetEvent) -> Result<(), SinkError>;
}

/// Full fleet state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Every pump, ordered by id.
    pub pumps: Vec<Pump>,
    /// Fleet health computed from those pumps.
    pub system_health: HealthSnapshot,
    /// Operators currently logged in.
    pub users_online: usize,
    /// Snapshot time.
    pub timestamp: DateTime<Utc>,
}

/// A single pump changed through a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpUpdate {
    /// Pump id.
    pub pump_id: PumpId,
    /// New pump state.
    pub pump: Pump,
    /// Human readable description of the change.
    pub message: String,
    /// Issuing operator.
    #[serde(rename = "user")]
    pub actor: String,
}

/// Result of a fleet-wide command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetCommandResult {
    /// Human readable summary.
    pub message: String,
    /// Issuing operator.
    #[serde(rename = "user")]
    pub actor: String,
    /// Names of the pumps the command changed.
    pub affected: Vec<String>,
    /// Fleet state after the command.
    pub pumps: Vec<Pump>,
}

/// An alert just derived for a pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRaised {
    /// Pump id.
    pub pump_id: PumpId,
    /// Pump name.
    pub pump_name: String,
    /// The alert.
    pub alert: Alert,
}

/// Operator presence change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceChange {
    /// Operator who logged in or out.
    pub user: Operator,
    /// Operators online after the change.
    pub users_online: usize,
}

/// Every event the core emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum FleetEvent {
    /// Periodic or on-demand fleet snapshot.
    DataUpdate(FleetSnapshot),
    /// Single pump changed via a command.
    PumpUpdated(PumpUpdate),
    /// Every running pump was emergency stopped.
    EmergencyStopAll(FleetCommandResult),
    /// Automatic mode enabled on every unlatched pump.
    AutoModeAll(FleetCommandResult),
    /// One alert derived for one pump.
    NewAlert(AlertRaised),
    /// One activity entry appended.
    NewActivity(ActivityLogEntry),
    /// An operator logged in.
    UserConnected(PresenceChange),
    /// An operator logged out.
    UserDisconnected(PresenceChange),
}

impl FleetEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DataUpdate(_) => "data_update",
            Self::PumpUpdated(_) => "pump_updated",
            Self::EmergencyStopAll(_) => "emergency_stop_all",
            Self::AutoModeAll(_) => "auto_mode_all",
            Self::NewAlert(_) => "new_alert",
            Self::NewActivity(_) => "new_activity",
            Self::UserConnected(_) => "user_connected",
            Self::UserDisconnected(_) => "user_disconnected",
        }
    }
}
