//! Operator command handling.
//!
//! Commands mutate the registry under its write lock, then append an
//! activity entry and publish the matching event after the lock is released.
//! A rejected command leaves no trace in fleet state or the activity log.
//!
//! # State Machine
//!
//! ```text
//!            start                 emergency_stop
//!  stopped ─────────► running ─────────────────────► emergency_stop (latched)
//!     ▲                  │                                   │
//!     │      stop        │                                   │ reset_emergency
//!     └──────────────────┘◄──────────────────────────────────┘
//!
//!  standby / maintenance are reachable from any status.
//!  start is rejected while the latch is set.
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pump::activity::ActivityCategory;
use pump::consts::UNKNOWN_ACTOR;
use pump::control::{ControlAction, ControlCommand, ControlError};
use pump::event::{EventSink, FleetCommandResult, FleetEvent, PumpUpdate};
use pump::pump::{Pump, PumpId, PumpStatus};
use tracing::{info, warn};

use crate::activity::ActivityLog;
use crate::registry::PumpRegistry;

/// Applies operator commands to the fleet.
#[derive(Clone)]
pub struct ControlHandler {
    registry: Arc<PumpRegistry>,
    activity: Arc<ActivityLog>,
    sink: Arc<dyn EventSink>,
}

impl ControlHandler {
    /// Create a handler over the shared registry.
    pub fn new(
        registry: Arc<PumpRegistry>,
        activity: Arc<ActivityLog>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            activity,
            sink,
        }
    }

    /// Apply one command delivered by the transport layer.
    ///
    /// # Errors
    /// See [`ControlHandler::apply`].
    pub fn handle(&self, command: &ControlCommand) -> Result<(Pump, String), ControlError> {
        self.apply(command.pump_id, &command.action, &command.actor)
    }

    /// Apply `action` to one pump.
    ///
    /// Returns the pump after the change and a human readable message.
    ///
    /// # Errors
    /// - [`ControlError::NotFound`] if no pump has `pump_id`
    /// - [`ControlError::InvalidAction`] for an unknown action string
    /// - [`ControlError::InvariantViolation`] for `start` while latched
    pub fn apply(
        &self,
        pump_id: PumpId,
        action: &str,
        actor: &str,
    ) -> Result<(Pump, String), ControlError> {
        let actor = actor_or_default(actor);
        let now = Utc::now();

        let (pump, message) = self
            .registry
            .update(pump_id, |pump| {
                let parsed: ControlAction = action.parse()?;
                transition(pump, parsed, now)
            })
            .ok_or(ControlError::NotFound(pump_id))??;

        info!("{} (by {})", message, actor);
        self.activity
            .append(&message, actor, ActivityCategory::Operation, Some(pump_id));
        self.emit(FleetEvent::PumpUpdated(PumpUpdate {
            pump_id,
            pump: pump.clone(),
            message: message.clone(),
            actor: actor.to_string(),
        }));

        Ok((pump, message))
    }

    /// Emergency stop every running pump.
    ///
    /// Returns the names of the pumps that were stopped.
    pub fn emergency_stop_all(&self, actor: &str) -> Vec<String> {
        let actor = actor_or_default(actor);
        let now = Utc::now();

        let (stopped, pumps) = self.registry.update_all(|pumps| {
            let mut stopped = Vec::new();
            for pump in pumps.iter_mut().filter(|p| p.is_running()) {
                pump.status = PumpStatus::EmergencyStop;
                pump.emergency_stop = true;
                pump.updated_at = now;
                stopped.push(pump.name.clone());
            }
            (stopped, pumps.to_vec())
        });

        let message = format!("Emergency stop applied to all pumps ({} pumps)", stopped.len());
        warn!("Fleet emergency stop by {}: {:?}", actor, stopped);
        self.activity
            .append(&message, actor, ActivityCategory::Emergency, None);
        self.emit(FleetEvent::EmergencyStopAll(FleetCommandResult {
            message,
            actor: actor.to_string(),
            affected: stopped.clone(),
            pumps,
        }));

        stopped
    }

    /// Enable automatic mode on every pump whose latch is clear.
    ///
    /// Returns the names of the pumps that were switched.
    pub fn auto_mode_all(&self, actor: &str) -> Vec<String> {
        let actor = actor_or_default(actor);
        let now = Utc::now();

        let (switched, pumps) = self.registry.update_all(|pumps| {
            let mut switched = Vec::new();
            for pump in pumps.iter_mut().filter(|p| !p.emergency_stop) {
                pump.auto_mode = true;
                pump.updated_at = now;
                switched.push(pump.name.clone());
            }
            (switched, pumps.to_vec())
        });

        let message = format!("Automatic mode enabled on all pumps ({} pumps)", switched.len());
        info!("{} (by {})", message, actor);
        self.activity
            .append(&message, actor, ActivityCategory::Configuration, None);
        self.emit(FleetEvent::AutoModeAll(FleetCommandResult {
            message,
            actor: actor.to_string(),
            affected: switched.clone(),
            pumps,
        }));

        switched
    }

    fn emit(&self, event: FleetEvent) {
        let name = event.name();
        if let Err(e) = self.sink.publish(event) {
            warn!("Failed to publish {}: {}", name, e);
        }
    }
}

/// Apply one action to a pump already located in the registry.
///
/// Validation happens before any field is written.
fn transition(
    pump: &mut Pump,
    action: ControlAction,
    now: DateTime<Utc>,
) -> Result<(Pump, String), ControlError> {
    let message = match action {
        ControlAction::Start => {
            if pump.emergency_stop {
                return Err(ControlError::InvariantViolation { pump_id: pump.id });
            }
            pump.status = PumpStatus::Running;
            format!("{} started", pump.name)
        }
        ControlAction::Stop => {
            pump.status = PumpStatus::Stopped;
            format!("{} stopped", pump.name)
        }
        ControlAction::EmergencyStop => {
            pump.status = PumpStatus::EmergencyStop;
            pump.emergency_stop = true;
            format!("Emergency stop applied to {}", pump.name)
        }
        ControlAction::Standby => {
            pump.status = PumpStatus::Standby;
            format!("{} placed in standby", pump.name)
        }
        ControlAction::Auto => {
            pump.auto_mode = !pump.auto_mode;
            let mode = if pump.auto_mode { "automatic" } else { "manual" };
            format!("{} switched to {} mode", pump.name, mode)
        }
        ControlAction::ResetEmergency => {
            pump.emergency_stop = false;
            pump.status = PumpStatus::Stopped;
            format!("Emergency stop reset for {}", pump.name)
        }
        ControlAction::Maintenance => {
            pump.status = PumpStatus::Maintenance;
            format!("{} placed under maintenance", pump.name)
        }
    };
    pump.updated_at = now;
    Ok((pump.clone(), message))
}

fn actor_or_default(actor: &str) -> &str {
    if actor.trim().is_empty() {
        UNKNOWN_ACTOR
    } else {
        actor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use pump::config::PumpSpec;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::broadcast::Receiver;

    use crate::drivers::simulation::seed_fleet;

    struct Rig {
        handler: ControlHandler,
        registry: Arc<PumpRegistry>,
        activity: Arc<ActivityLog>,
        rx: Receiver<FleetEvent>,
    }

    fn rig() -> Rig {
        let bus = Arc::new(EventBus::default());
        let rx = bus.subscribe();
        let mut rng = StdRng::seed_from_u64(9);
        let fleet = seed_fleet(&PumpSpec::default_fleet(), &mut rng, Utc::now());
        let registry = Arc::new(PumpRegistry::new(fleet));
        let activity = Arc::new(ActivityLog::new(100, bus.clone()));
        let handler = ControlHandler::new(registry.clone(), activity.clone(), bus);
        Rig {
            handler,
            registry,
            activity,
            rx,
        }
    }

    fn drain(rx: &mut Receiver<FleetEvent>) -> Vec<FleetEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn start_stop_cycle() {
        let rig = rig();
        let (pump, message) = rig.handler.apply(5, "start", "op1").unwrap();
        assert_eq!(pump.status, PumpStatus::Running);
        assert!(message.contains("Oil Pump 5"));

        let (pump, _) = rig.handler.apply(5, "stop", "op1").unwrap();
        assert_eq!(pump.status, PumpStatus::Stopped);
        assert_eq!(rig.registry.get(5).unwrap().status, PumpStatus::Stopped);
    }

    #[test]
    fn latch_blocks_start_until_reset() {
        let rig = rig();
        let (pump, _) = rig.handler.apply(1, "emergency_stop", "op1").unwrap();
        assert_eq!(pump.status, PumpStatus::EmergencyStop);
        assert!(pump.emergency_stop);

        let err = rig.handler.apply(1, "start", "op1").unwrap_err();
        assert_eq!(err, ControlError::InvariantViolation { pump_id: 1 });

        // Other actions leave the latch alone.
        let (pump, _) = rig.handler.apply(1, "standby", "op1").unwrap();
        assert!(pump.emergency_stop);
        assert!(rig.handler.apply(1, "start", "op1").is_err());

        let (pump, _) = rig.handler.apply(1, "reset_emergency", "op1").unwrap();
        assert_eq!(pump.status, PumpStatus::Stopped);
        assert!(!pump.emergency_stop);

        let (pump, _) = rig.handler.apply(1, "start", "op1").unwrap();
        assert_eq!(pump.status, PumpStatus::Running);
    }

    #[test]
    fn auto_toggles_mode_only() {
        let rig = rig();
        rig.registry.update(3, |p| p.auto_mode = false);
        let before = rig.registry.get(3).unwrap();

        let (pump, message) = rig.handler.apply(3, "auto", "op1").unwrap();
        assert!(pump.auto_mode);
        assert_eq!(pump.status, before.status);
        assert!(message.contains("automatic"));

        let (pump, _) = rig.handler.apply(3, "auto", "op1").unwrap();
        assert!(!pump.auto_mode);
    }

    #[test]
    fn maintenance_and_standby() {
        let rig = rig();
        let (pump, _) = rig.handler.apply(2, "maintenance", "op1").unwrap();
        assert_eq!(pump.status, PumpStatus::Maintenance);
        let (pump, _) = rig.handler.apply(2, "standby", "op1").unwrap();
        assert_eq!(pump.status, PumpStatus::Standby);
    }

    #[test]
    fn errors_leave_no_trace() {
        let mut rig = rig();
        let before = rig.registry.snapshot();

        assert_eq!(
            rig.handler.apply(99, "start", "op1").unwrap_err(),
            ControlError::NotFound(99)
        );
        assert_eq!(
            rig.handler.apply(1, "launch", "op1").unwrap_err(),
            ControlError::InvalidAction("launch".into())
        );
        // Unknown pump is reported before the action is parsed.
        assert_eq!(
            rig.handler.apply(99, "launch", "op1").unwrap_err(),
            ControlError::NotFound(99)
        );

        assert_eq!(rig.registry.snapshot(), before);
        assert!(rig.activity.is_empty());
        assert!(drain(&mut rig.rx).is_empty());
    }

    #[test]
    fn success_logs_activity_and_publishes() {
        let mut rig = rig();
        rig.handler
            .handle(&ControlCommand::new(4, "stop", "38859"))
            .unwrap();

        let entries = rig.activity.recent(0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, ActivityCategory::Operation);
        assert_eq!(entries[0].pump_id, Some(4));
        assert_eq!(entries[0].actor, "38859");

        let events = drain(&mut rig.rx);
        let names: Vec<_> = events.iter().map(FleetEvent::name).collect();
        assert_eq!(names, vec!["new_activity", "pump_updated"]);
        match &events[1] {
            FleetEvent::PumpUpdated(update) => {
                assert_eq!(update.pump_id, 4);
                assert_eq!(update.pump.status, PumpStatus::Stopped);
                assert_eq!(update.actor, "38859");
            }
            other => panic!("unexpected {}", other.name()),
        }
    }

    #[test]
    fn blank_actor_is_recorded_as_unspecified() {
        let rig = rig();
        rig.handler.apply(1, "stop", "  ").unwrap();
        assert_eq!(rig.activity.recent(1)[0].actor, UNKNOWN_ACTOR);
    }

    #[test]
    fn emergency_stop_all_latches_running_pumps() {
        let mut rig = rig();
        let stopped = rig.handler.emergency_stop_all("supervisor");
        assert_eq!(
            stopped,
            vec!["Oil Pump 1", "Oil Pump 2", "Oil Pump 3", "Oil Pump 4"]
        );

        for pump in rig.registry.snapshot() {
            if pump.id <= 4 {
                assert_eq!(pump.status, PumpStatus::EmergencyStop);
                assert!(pump.emergency_stop);
            } else {
                assert_eq!(pump.status, PumpStatus::Stopped);
                assert!(!pump.emergency_stop);
            }
        }

        let entry = &rig.activity.recent(1)[0];
        assert_eq!(entry.category, ActivityCategory::Emergency);
        assert!(entry.message.contains('4'));

        let events = drain(&mut rig.rx);
        match events.last() {
            Some(FleetEvent::EmergencyStopAll(result)) => {
                assert_eq!(result.affected, stopped);
                assert_eq!(result.pumps.len(), 6);
                assert_eq!(result.actor, "supervisor");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn auto_mode_all_skips_latched_pumps() {
        let mut rig = rig();
        rig.handler.apply(2, "emergency_stop", "op").unwrap();
        rig.registry.update_all(|pumps| {
            for p in pumps.iter_mut() {
                p.auto_mode = false;
            }
        });
        drain(&mut rig.rx);

        let switched = rig.handler.auto_mode_all("op");
        assert_eq!(switched.len(), 5);
        assert!(!switched.contains(&"Oil Pump 2".to_string()));
        assert!(!rig.registry.get(2).unwrap().auto_mode);
        assert!(rig.registry.get(6).unwrap().auto_mode);
        assert_eq!(
            rig.activity.recent(1)[0].category,
            ActivityCategory::Configuration
        );

        let events = drain(&mut rig.rx);
        assert!(matches!(events.last(), Some(FleetEvent::AutoModeAll(r)) if r.affected == switched));
    }

    #[test]
    fn emergency_stop_all_with_nothing_running() {
        let rig = rig();
        for id in 1..=4 {
            rig.handler.apply(id, "stop", "op").unwrap();
        }
        assert!(rig.handler.emergency_stop_all("op").is_empty());
        assert!(
            rig.registry
                .snapshot()
                .iter()
                .all(|p| !p.emergency_stop)
        );
    }
}
