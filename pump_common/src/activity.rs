//! Operator activity log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pump::PumpId;

/// Category of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    /// General information (logins, startup).
    #[default]
    Info,
    /// Completed operation.
    Success,
    /// Something to look at.
    Warning,
    /// Failed operation.
    Error,
    /// Single-pump control command.
    Operation,
    /// Emergency action.
    Emergency,
    /// Mode or configuration change.
    Configuration,
}

/// One appended record. Entries are immutable once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Monotonic id, unique for the process lifetime.
    pub id: u64,
    /// Human readable message.
    pub message: String,
    /// Operator or subsystem responsible.
    #[serde(rename = "user")]
    pub actor: String,
    /// Category.
    #[serde(rename = "type")]
    pub category: ActivityCategory,
    /// Pump concerned, if any.
    pub pump_id: Option<PumpId>,
    /// Append time.
    pub timestamp: DateTime<Utc>,
}
