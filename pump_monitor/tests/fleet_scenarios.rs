//! End-to-end fleet scenarios.
//!
//! These tests wire the real components together over an [`EventBus`] and
//! drive them through the public API only: ticks, operator commands and
//! logins, checking both fleet state and the events a transport would see.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pump::prelude::*;
use pump_monitor::drivers::TelemetryDriver;
use pump_monitor::{ActivityLog, ControlHandler, EventBus, Monitor, PumpRegistry, Sessions};
use pump_monitor::{LoopState, StaticAuthProvider};
use tokio::sync::broadcast::Receiver;

/// Driver that keeps metrics fixed so thresholds can be hit exactly.
struct HoldDriver;

impl TelemetryDriver for HoldDriver {
    fn name(&self) -> &'static str {
        "hold"
    }

    fn version(&self) -> &'static str {
        "0.0.0"
    }

    fn advance(&mut self, pump: &mut Pump, now: DateTime<Utc>) {
        pump.updated_at = now;
    }
}

fn nominal() -> Metrics {
    Metrics {
        pressure: 65.0,
        temperature: 70.0,
        flow_rate: 220.0,
        vibration: 1.0,
        power: 80.0,
        efficiency: 90.0,
    }
}

fn pump(id: PumpId, status: PumpStatus, metrics: Metrics) -> Pump {
    Pump::new(id, format!("Oil Pump {id}"), "centrifugal", "yard", Utc::now())
        .with_status(status)
        .with_metrics(metrics)
}

struct Fleet {
    bus: Arc<EventBus>,
    rx: Receiver<FleetEvent>,
    registry: Arc<PumpRegistry>,
    activity: Arc<ActivityLog>,
    sessions: Arc<Sessions>,
    control: ControlHandler,
    monitor: Monitor,
}

fn fleet(pumps: Vec<Pump>) -> Fleet {
    let bus = Arc::new(EventBus::new(512));
    let rx = bus.subscribe();
    let sink: Arc<dyn EventSink> = bus.clone();
    let registry = Arc::new(PumpRegistry::new(pumps));
    let activity = Arc::new(ActivityLog::new(100, Arc::clone(&sink)));
    let operators = [pump::config::OperatorSpec {
        employee_id: "38859".to_string(),
        name: "Station Administrator".to_string(),
        role: OperatorRole::Admin,
        password: "12345".to_string(),
        department: "Operations".to_string(),
        position: "Shift Supervisor".to_string(),
    }];
    let sessions = Arc::new(Sessions::new(
        Box::new(StaticAuthProvider::new(&operators)),
        Arc::clone(&activity),
        Arc::clone(&sink),
    ));
    let control = ControlHandler::new(
        Arc::clone(&registry),
        Arc::clone(&activity),
        Arc::clone(&sink),
    );
    let monitor = Monitor::new(
        Arc::clone(&registry),
        Box::new(HoldDriver),
        Arc::clone(&sessions),
        sink,
        Duration::from_millis(20),
    );
    Fleet {
        bus,
        rx,
        registry,
        activity,
        sessions,
        control,
        monitor,
    }
}

fn drain(rx: &mut Receiver<FleetEvent>) -> Vec<FleetEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ─── Alerting ───────────────────────────────────────────────────────

#[test]
fn low_pressure_raises_one_warning_then_snapshot() {
    let mut f = fleet(vec![pump(
        1,
        PumpStatus::Running,
        Metrics {
            pressure: 45.0,
            ..nominal()
        },
    )]);

    let report = f.monitor.tick().unwrap();
    assert_eq!(report.alerts, 1);

    let events = drain(&mut f.rx);
    assert_eq!(events.len(), 2);
    match &events[0] {
        FleetEvent::NewAlert(raised) => {
            assert_eq!(raised.pump_id, 1);
            assert_eq!(raised.pump_name, "Oil Pump 1");
            assert_eq!(raised.alert.kind, AlertKind::PressureLow);
            assert_eq!(raised.alert.severity, Severity::Warning);
            assert_eq!(raised.alert.id, "pressure_low_1");
            assert_eq!(
                raised.alert.description,
                "Current pressure 45 bar is below the minimum 50 bar"
            );
            assert_eq!(raised.alert.recommendations.len(), 3);
        }
        other => panic!("expected new_alert, got {}", other.name()),
    }
    match &events[1] {
        FleetEvent::DataUpdate(snapshot) => {
            assert_eq!(snapshot.pumps.len(), 1);
            assert_eq!(snapshot.pumps[0].alerts.len(), 1);
            assert_eq!(snapshot.system_health.score, 95.5);
        }
        other => panic!("expected data_update, got {}", other.name()),
    }
}

#[test]
fn alert_clears_once_condition_is_gone() {
    let mut f = fleet(vec![pump(
        1,
        PumpStatus::Running,
        Metrics {
            pressure: 45.0,
            ..nominal()
        },
    )]);
    f.monitor.tick().unwrap();
    assert_eq!(f.monitor.handle().fleet_alerts().len(), 1);

    f.registry.update(1, |p| p.metrics.pressure = 60.0).unwrap();
    let report = f.monitor.tick().unwrap();
    assert_eq!(report.alerts, 0);
    assert!(f.monitor.handle().fleet_alerts().is_empty());
}

#[test]
fn fleet_alerts_list_critical_first() {
    let mut f = fleet(vec![
        pump(
            1,
            PumpStatus::Running,
            Metrics {
                efficiency: 80.0,
                ..nominal()
            },
        ),
        pump(
            2,
            PumpStatus::Running,
            Metrics {
                temperature: 95.0,
                ..nominal()
            },
        ),
    ]);
    f.monitor.tick().unwrap();

    let listed = f.monitor.handle().fleet_alerts();
    let kinds: Vec<_> = listed.iter().map(|a| a.alert.kind).collect();
    assert_eq!(kinds, vec![AlertKind::TemperatureHigh, AlertKind::EfficiencyLow]);
    assert_eq!(listed[0].pump_name, "Oil Pump 2");
}

// ─── Health ─────────────────────────────────────────────────────────

#[test]
fn six_healthy_running_pumps_score_excellent() {
    let pumps = (1..=6)
        .map(|id| pump(id, PumpStatus::Running, nominal()))
        .collect();
    let mut f = fleet(pumps);

    let report = f.monitor.tick().unwrap();
    assert_eq!(report.health.score, 97.5);
    assert_eq!(report.health.status, HealthStatus::Excellent);
    assert_eq!(report.health.factors.pump_availability, 100.0);
    assert_eq!(report.health.factors.avg_efficiency, 90.0);
    assert_eq!(f.monitor.handle().health(), report.health);
}

#[test]
fn emergency_stops_drag_health_down() {
    let pumps = (1..=6)
        .map(|id| pump(id, PumpStatus::Running, nominal()))
        .collect();
    let mut f = fleet(pumps);
    let before = f.monitor.tick().unwrap().health.score;

    f.control.emergency_stop_all("38859");
    let after = f.monitor.tick().unwrap().health;
    assert!(after.score < before);
    assert_eq!(after.factors.emergency_pumps, 6);
    assert_eq!(after.status, HealthStatus::Critical);
}

// ─── Control ────────────────────────────────────────────────────────

#[test]
fn emergency_stop_all_latches_only_running_pumps() {
    let pumps = (1..=6)
        .map(|id| {
            let status = if id <= 4 {
                PumpStatus::Running
            } else {
                PumpStatus::Stopped
            };
            pump(id, status, nominal())
        })
        .collect();
    let mut f = fleet(pumps);

    let stopped = f.control.emergency_stop_all("38859");
    assert_eq!(
        stopped,
        vec!["Oil Pump 1", "Oil Pump 2", "Oil Pump 3", "Oil Pump 4"]
    );
    f.registry.read(|pumps| {
        for p in pumps {
            assert!(p.latch_consistent());
            assert_eq!(p.emergency_stop, p.id <= 4);
        }
    });

    let events = drain(&mut f.rx);
    let result = events
        .iter()
        .find_map(|e| match e {
            FleetEvent::EmergencyStopAll(result) => Some(result),
            _ => None,
        })
        .unwrap();
    assert_eq!(result.affected.len(), 4);
    assert_eq!(result.pumps.len(), 6);
    assert_eq!(result.actor, "38859");

    let latest = &f.activity.recent(1)[0];
    assert_eq!(latest.category, ActivityCategory::Emergency);
    assert_eq!(latest.actor, "38859");
}

#[test]
fn latched_pump_must_be_reset_before_start() {
    let mut f = fleet(vec![pump(1, PumpStatus::Running, nominal())]);
    f.control.apply(1, "emergency_stop", "38859").unwrap();

    let err = f.control.apply(1, "start", "38859").unwrap_err();
    assert_eq!(err, ControlError::InvariantViolation { pump_id: 1 });
    assert_eq!(f.registry.get(1).unwrap().status, PumpStatus::EmergencyStop);

    let (after_reset, _) = f.control.apply(1, "reset_emergency", "38859").unwrap();
    assert_eq!(after_reset.status, PumpStatus::Stopped);
    assert!(!after_reset.emergency_stop);

    let (started, message) = f.control.apply(1, "start", "38859").unwrap();
    assert_eq!(started.status, PumpStatus::Running);
    assert_eq!(message, "Oil Pump 1 started");

    let updates = drain(&mut f.rx)
        .into_iter()
        .filter(|e| matches!(e, FleetEvent::PumpUpdated(_)))
        .count();
    assert_eq!(updates, 3);
}

#[test]
fn auto_toggles_and_fleet_auto_skips_latched() {
    let f = fleet(vec![
        pump(1, PumpStatus::Running, nominal()).with_auto_mode(false),
        pump(2, PumpStatus::EmergencyStop, nominal()).with_auto_mode(false),
    ]);

    let (on, _) = f.control.apply(1, "auto", "38859").unwrap();
    assert!(on.auto_mode);
    let (off, _) = f.control.apply(1, "auto", "38859").unwrap();
    assert!(!off.auto_mode);
    assert_eq!(off.status, PumpStatus::Running);

    let switched = f.control.auto_mode_all("");
    assert_eq!(switched, vec!["Oil Pump 1"]);
    assert!(f.registry.get(1).unwrap().auto_mode);
    assert!(!f.registry.get(2).unwrap().auto_mode);
    assert_eq!(f.activity.recent(1)[0].category, ActivityCategory::Configuration);
}

#[test]
fn rejected_commands_leave_no_trace() {
    let mut f = fleet(vec![pump(1, PumpStatus::Stopped, nominal())]);
    let before = f.registry.snapshot();

    assert_eq!(
        f.control.apply(99, "bogus", "38859").unwrap_err(),
        ControlError::NotFound(99)
    );
    assert_eq!(
        f.control.apply(1, "bogus", "38859").unwrap_err(),
        ControlError::InvalidAction("bogus".to_string())
    );

    assert_eq!(f.registry.snapshot(), before);
    assert!(f.activity.is_empty());
    assert!(drain(&mut f.rx).is_empty());
}

#[test]
fn transport_command_reaches_handler() {
    let f = fleet(vec![pump(1, PumpStatus::Stopped, nominal())]);
    let command: ControlCommand =
        serde_json::from_str(r#"{"pump_id":1,"action":"maintenance","user_id":"38859"}"#).unwrap();

    let (updated, _) = f.control.handle(&command).unwrap();
    assert_eq!(updated.status, PumpStatus::Maintenance);
    assert_eq!(f.activity.recent(1)[0].pump_id, Some(1));
}

// ─── Sessions ───────────────────────────────────────────────────────

#[test]
fn presence_is_reported_in_snapshots() {
    let mut f = fleet(vec![pump(1, PumpStatus::Running, nominal())]);

    assert_eq!(
        f.sessions.login("s1", "38859", "wrong").unwrap_err(),
        AuthError::InvalidCredentials
    );
    let operator = f.sessions.login("s1", "38859", "12345").unwrap();
    assert_eq!(operator.role, OperatorRole::Admin);

    f.monitor.tick().unwrap();
    let users_online = drain(&mut f.rx)
        .into_iter()
        .find_map(|e| match e {
            FleetEvent::DataUpdate(s) => Some(s.users_online),
            _ => None,
        })
        .unwrap();
    assert_eq!(users_online, 1);
    assert_eq!(f.monitor.handle().fleet_stats().users_online, 1);

    f.sessions.logout("s1").unwrap();
    assert_eq!(f.monitor.handle().fleet_stats().users_online, 0);
}

// ─── Loop ───────────────────────────────────────────────────────────

#[test]
fn closed_sink_degrades_loop() {
    let mut f = fleet(vec![pump(1, PumpStatus::Running, nominal())]);
    f.bus.close();

    let delay = f.monitor.step();
    assert_eq!(delay, Duration::from_millis(40));
    assert_eq!(f.monitor.state(), LoopState::DegradedRetry);
    assert_eq!(f.monitor.handle().stats().failed_ticks, 1);
}
