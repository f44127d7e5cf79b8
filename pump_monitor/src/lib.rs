//! # Pump Monitor Library
//!
//! Telemetry simulation, threshold alerting and health scoring for a fleet
//! of industrial pumps.
//!
//! Telemetry comes from a pluggable [`drivers::TelemetryDriver`]; the only
//! built-in driver is the simulation. Every outbound state change is handed
//! to an [`pump::event::EventSink`] as a typed [`pump::event::FleetEvent`].
//!
//! # Module Structure
//!
//! - [`registry`] - Fleet state behind one coarse lock
//! - [`drivers`] - Telemetry drivers
//! - [`alerts`] - Threshold alert evaluation
//! - [`health`] - Fleet health scoring
//! - [`monitor`] - Periodic loop and its state machine
//! - [`control`] - Operator commands
//! - [`activity`] - Bounded activity log
//! - [`sessions`] - Online operators and the static auth provider
//! - [`queries`] - Fleet statistics and alert listing
//! - [`bus`] - Broadcast event sink
//! - [`station`] - Component wiring
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                           pump_monitor                            │
//! │  ┌──────────────┐     ┌──────────────┐     ┌───────────────────┐  │
//! │  │ControlHandler│────►│ PumpRegistry │◄────│     Monitor       │  │
//! │  │ Sessions     │     │  (RwLock)    │     │    (tick loop)    │  │
//! │  └──────┬───────┘     └──────────────┘     └──┬─────────┬──────┘  │
//! │         │                                     │         │         │
//! │         ▼                                     ▼         ▼         │
//! │  ┌──────────────┐                  ┌──────────────┐ ┌──────────┐  │
//! │  │ ActivityLog  │                  │ Telemetry    │ │ alerts / │  │
//! │  │ (ring)       │                  │ Driver       │ │ health   │  │
//! │  └──────┬───────┘                  └──────────────┘ └──────────┘  │
//! │         │              ┌──────────────┐                 │         │
//! │         └─────────────►│  EventSink   │◄────────────────┘         │
//! │                        │  (EventBus)  │                           │
//! │                        └──────────────┘                           │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod activity;
pub mod alerts;
pub mod bus;
pub mod control;
pub mod drivers;
pub mod health;
pub mod monitor;
pub mod queries;
pub mod registry;
pub mod sessions;
pub mod station;

// Re-export key types for convenience
pub use crate::activity::ActivityLog;
pub use crate::bus::EventBus;
pub use crate::control::ControlHandler;
pub use crate::monitor::{LoopState, Monitor, MonitorHandle, TickError};
pub use crate::queries::FleetStats;
pub use crate::registry::PumpRegistry;
pub use crate::sessions::{Sessions, StaticAuthProvider};
pub use crate::station::Station;
