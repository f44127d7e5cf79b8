//! Operator command types.
//!
//! A [`ControlCommand`] arrives from the transport layer with a raw action
//! string. Parsing happens in the control handler so that an unknown action
//! surfaces as [`ControlError::InvalidAction`] with nothing mutated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::pump::PumpId;

/// Errors surfaced synchronously to the issuer of a command.
///
/// None of these leave any trace in fleet state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    /// No pump with the requested id.
    #[error("pump {0} not found")]
    NotFound(PumpId),

    /// Unrecognised action string.
    #[error("invalid action: {0:?}")]
    InvalidAction(String),

    /// Start requested while the emergency stop latch is set.
    #[error("pump {pump_id} cannot start while emergency stop is latched")]
    InvariantViolation {
        /// Pump the command targeted.
        pump_id: PumpId,
    },
}

/// Single-pump control action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Start pumping. Rejected while latched.
    Start,
    /// Normal stop.
    Stop,
    /// Emergency stop; sets the latch.
    EmergencyStop,
    /// Put in standby.
    Standby,
    /// Toggle automatic mode.
    Auto,
    /// Clear the latch and leave the pump stopped.
    ResetEmergency,
    /// Put under maintenance.
    Maintenance,
}

impl ControlAction {
    /// Wire name of the action.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::EmergencyStop => "emergency_stop",
            Self::Standby => "standby",
            Self::Auto => "auto",
            Self::ResetEmergency => "reset_emergency",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlAction {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "emergency_stop" => Ok(Self::EmergencyStop),
            "standby" => Ok(Self::Standby),
            "auto" => Ok(Self::Auto),
            "reset_emergency" => Ok(Self::ResetEmergency),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(ControlError::InvalidAction(other.to_string())),
        }
    }
}

/// Command delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCommand {
    /// Target pump.
    pub pump_id: PumpId,
    /// Raw action string.
    pub action: String,
    /// Issuing operator.
    #[serde(rename = "user_id")]
    pub actor: String,
}

impl ControlCommand {
    /// Build a command.
    pub fn new(pump_id: PumpId, action: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            pump_id,
            action: action.into(),
            actor: actor.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_actions() {
        for action in [
            ControlAction::Start,
            ControlAction::Stop,
            ControlAction::EmergencyStop,
            ControlAction::Standby,
            ControlAction::Auto,
            ControlAction::ResetEmergency,
            ControlAction::Maintenance,
        ] {
            assert_eq!(action.as_str().parse::<ControlAction>(), Ok(action));
        }
    }

    #[test]
    fn parse_unknown_action_is_invalid() {
        assert_eq!(
            "explode".parse::<ControlAction>(),
            Err(ControlError::InvalidAction("explode".into()))
        );
        // Wire names are lowercase only.
        assert!("START".parse::<ControlAction>().is_err());
    }

    #[test]
    fn error_messages_name_the_pump() {
        assert!(ControlError::NotFound(9).to_string().contains('9'));
        let err = ControlError::InvariantViolation { pump_id: 4 };
        assert!(err.to_string().contains("pump 4"));
    }
}
