//! Prelude module for common re-exports.
//!
//! ```rust
//! use pump_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig, StationConfig};

// ─── Fleet Model ────────────────────────────────────────────────────
pub use crate::alert::{Alert, AlertKind, FleetAlert, Severity};
pub use crate::health::{HealthFactors, HealthSnapshot, HealthStatus};
pub use crate::pump::{MetricKind, Metrics, Pump, PumpId, PumpStatus, Thresholds};

// ─── Commands & Activity ────────────────────────────────────────────
pub use crate::activity::{ActivityCategory, ActivityLogEntry};
pub use crate::control::{ControlAction, ControlCommand, ControlError};

// ─── Identity ───────────────────────────────────────────────────────
pub use crate::auth::{AuthError, AuthProvider, Operator, OperatorRole};

// ─── Events ─────────────────────────────────────────────────────────
pub use crate::event::{EventSink, FleetEvent, FleetSnapshot, SinkError};
