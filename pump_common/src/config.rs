//! Configuration loading traits and types.
//!
//! All configuration is TOML. Any deserializable type gets
//! [`ConfigLoader::load`] through a blanket impl; [`StationConfig`] is the
//! top-level file of the monitor and adds semantic validation on top.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pump_common::config::{ConfigError, StationConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = StationConfig::load_validated(Path::new("config/station.toml"))?;
//!     println!("Service: {}", config.shared.service_name);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::auth::OperatorRole;
use crate::consts::{
    DEFAULT_ACTIVITY_CAPACITY, DEFAULT_BASE_PERIOD_MS, DEFAULT_EVENT_CAPACITY,
    DEFAULT_FLEET_SIZE, DEFAULT_SERVICE_NAME,
};
use crate::pump::{PumpStatus, Thresholds};

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common fields shared by every service configuration.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "pump-monitor-site-a"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_period_ms() -> u64 {
    DEFAULT_BASE_PERIOD_MS
}

fn default_activity_capacity() -> usize {
    DEFAULT_ACTIVITY_CAPACITY
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

fn default_true() -> bool {
    true
}

/// Monitoring loop settings (`[monitor]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Tick period while healthy, in milliseconds. Doubled while degraded.
    #[serde(default = "default_base_period_ms")]
    pub base_period_ms: u64,

    /// Activity log ring buffer capacity.
    #[serde(default = "default_activity_capacity")]
    pub activity_capacity: usize,

    /// Broadcast buffer capacity of the event bus.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Fixed seed for the simulator. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            base_period_ms: DEFAULT_BASE_PERIOD_MS,
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            seed: None,
        }
    }
}

impl MonitorConfig {
    /// Healthy tick period.
    pub fn base_period(&self) -> Duration {
        Duration::from_millis(self.base_period_ms)
    }
}

/// One configured pump (`[[pumps]]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpSpec {
    /// Display name, unique within the station.
    pub name: String,

    /// Construction type.
    #[serde(rename = "type")]
    pub pump_type: String,

    /// Installation site.
    pub location: String,

    /// Status at startup.
    #[serde(default)]
    pub status: PumpStatus,

    /// Automatic mode at startup.
    #[serde(default = "default_true")]
    pub auto_mode: bool,

    /// Alerting bounds; omitted fields take the defaults.
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl PumpSpec {
    /// The built-in fleet: six pumps, the first four running.
    pub fn default_fleet() -> Vec<PumpSpec> {
        const TYPES: [&str; DEFAULT_FLEET_SIZE] = [
            "centrifugal",
            "reciprocating",
            "rotary",
            "submersible",
            "axial",
            "gear",
        ];
        const LOCATIONS: [&str; DEFAULT_FLEET_SIZE] = [
            "north sector",
            "south sector",
            "east sector",
            "west sector",
            "central sector",
            "coastal sector",
        ];

        TYPES
            .iter()
            .zip(LOCATIONS)
            .enumerate()
            .map(|(idx, (pump_type, location))| PumpSpec {
                name: format!("Oil Pump {}", idx + 1),
                pump_type: (*pump_type).to_string(),
                location: location.to_string(),
                status: if idx < 4 {
                    PumpStatus::Running
                } else {
                    PumpStatus::Stopped
                },
                auto_mode: true,
                thresholds: Thresholds::default(),
            })
            .collect()
    }
}

/// One operator allowed to log in (`[[operators]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSpec {
    /// Login id.
    pub employee_id: String,
    /// Display name.
    pub name: String,
    /// Role.
    #[serde(default)]
    pub role: OperatorRole,
    /// Password, compared verbatim.
    pub password: String,
    /// Department.
    #[serde(default)]
    pub department: String,
    /// Job title.
    #[serde(default)]
    pub position: String,
}

/// Top-level monitor configuration (`station.toml`).
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// service_name = "pump-monitor"
///
/// [monitor]
/// base_period_ms = 5000
/// seed = 42
///
/// [[pumps]]
/// name = "Oil Pump 1"
/// type = "centrifugal"
/// location = "north sector"
/// status = "running"
///
/// [pumps.thresholds]
/// pressure_max = 75.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationConfig {
    /// Common service fields.
    #[serde(default)]
    pub shared: SharedConfig,

    /// Loop settings.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Fleet definition. The built-in six-pump fleet is used when empty.
    #[serde(default)]
    pub pumps: Vec<PumpSpec>,

    /// Operators accepted by the static authentication provider.
    #[serde(default)]
    pub operators: Vec<OperatorSpec>,
}

impl StationConfig {
    /// Load from TOML and validate.
    ///
    /// # Errors
    /// Any [`ConfigError`] raised by loading or [`StationConfig::validate`].
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        debug!(
            "Loaded station config from {:?}: {} pumps, {} operators",
            path,
            config.pumps.len(),
            config.operators.len()
        );
        Ok(config)
    }

    /// Configured pumps, or the built-in fleet when none are listed.
    pub fn fleet_specs(&self) -> Vec<PumpSpec> {
        if self.pumps.is_empty() {
            PumpSpec::default_fleet()
        } else {
            self.pumps.clone()
        }
    }

    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// 1. `shared` is valid
    /// 2. `base_period_ms`, `activity_capacity` and `event_capacity` > 0
    /// 3. Pump names are non-empty and unique
    /// 4. Pump thresholds are consistent
    /// 5. Operator ids are non-empty and unique
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.monitor.base_period_ms == 0 {
            return Err(ConfigError::ValidationError(
                "base_period_ms must be greater than 0".to_string(),
            ));
        }
        if self.monitor.activity_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "activity_capacity must be greater than 0".to_string(),
            ));
        }
        if self.monitor.event_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "event_capacity must be greater than 0".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for pump in &self.pumps {
            if pump.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "pump name cannot be empty".to_string(),
                ));
            }
            if !names.insert(pump.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate pump name: {}",
                    pump.name
                )));
            }
            pump.thresholds.validate().map_err(|reason| {
                ConfigError::ValidationError(format!("pump {}: {reason}", pump.name))
            })?;
        }

        let mut ids = HashSet::new();
        for operator in &self.operators {
            if operator.employee_id.is_empty() {
                return Err(ConfigError::ValidationError(
                    "employee_id cannot be empty".to_string(),
                ));
            }
            if !ids.insert(operator.employee_id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate employee_id: {}",
                    operator.employee_id
                )));
            }
        }

        Ok(())
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if reading or TOML parsing fails
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
