//! Monitoring loop.
//!
//! The [`Monitor`] owns the telemetry driver and runs one tick per period:
//!
//! 1. advance every pump through the driver
//! 2. re-derive every pump's alerts
//! 3. score the fleet
//! 4. commit, then publish one `new_alert` per alert and one `data_update`
//!
//! Steps 1-3 run on a working copy under the registry write lock and are
//! committed together with the score, so readers never see alerts computed
//! against older metrics or a score computed against older alerts. A failed tick leaves
//! the fleet as it was.
//!
//! # Loop States
//!
//! ```text
//!                     tick failed
//!  RunningNormally ───────────────► DegradedRetry
//!    (base period) ◄─────────────── (2 x base period)
//!                    tick succeeded
//! ```
//!
//! The loop never ends on its own; the owner aborts its task.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use pump::alert::FleetAlert;
use pump::consts::DEGRADED_PERIOD_FACTOR;
use pump::event::{AlertRaised, EventSink, FleetEvent, FleetSnapshot, SinkError};
use pump::health::HealthSnapshot;
use pump::pump::{MetricKind, Pump, PumpId};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::alerts::evaluate;
use crate::drivers::TelemetryDriver;
use crate::health::score;
use crate::queries::{FleetStats, fleet_alerts};
use crate::registry::PumpRegistry;
use crate::sessions::Sessions;

/// Failures that abort one tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    /// The event sink refused a tick event.
    #[error("event sink failed: {0}")]
    Sink(#[from] SinkError),

    /// The driver produced NaN or an infinity.
    #[error("pump {pump_id} produced a non-finite {metric} reading")]
    NonFinite {
        /// Offending pump.
        pump_id: PumpId,
        /// Offending channel.
        metric: MetricKind,
    },
}

// ─── Loop State ─────────────────────────────────────────────────────

/// Scheduling state of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Ticking at the base period.
    #[default]
    RunningNormally,
    /// Last tick failed; ticking at twice the base period.
    DegradedRetry,
}

impl LoopState {
    /// Delay before the next tick.
    pub fn period(&self, base: Duration) -> Duration {
        match self {
            Self::RunningNormally => base,
            Self::DegradedRetry => base * DEGRADED_PERIOD_FACTOR,
        }
    }
}

/// Events that drive the loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// A tick committed and published.
    TickSucceeded,
    /// A tick returned an error.
    TickFailed,
}

impl LoopState {
    /// Next state after `event`. Every pair is valid.
    pub const fn handle_event(self, event: LoopEvent) -> Self {
        match event {
            LoopEvent::TickSucceeded => Self::RunningNormally,
            LoopEvent::TickFailed => Self::DegradedRetry,
        }
    }
}

// ─── Timing ─────────────────────────────────────────────────────────

/// Tick timing and failure counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Ticks attempted.
    pub tick_count: u64,
    /// Ticks that returned an error.
    pub failed_ticks: u64,
    /// Failures since the last successful tick.
    pub consecutive_failures: u64,
    /// Longest tick [us].
    pub max_tick_time_us: u64,
    /// Sum of tick durations [us].
    pub total_tick_time_us: u64,
}

impl TickStats {
    fn record(&mut self, elapsed: Duration, ok: bool) {
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.tick_count += 1;
        self.total_tick_time_us = self.total_tick_time_us.saturating_add(us);
        self.max_tick_time_us = self.max_tick_time_us.max(us);
        if ok {
            self.consecutive_failures = 0;
        } else {
            self.failed_ticks += 1;
            self.consecutive_failures += 1;
        }
    }

    /// Mean tick duration [us].
    pub fn avg_tick_time_us(&self) -> u64 {
        if self.tick_count == 0 {
            0
        } else {
            self.total_tick_time_us / self.tick_count
        }
    }
}

/// What one successful tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Alerts published this tick.
    pub alerts: usize,
    /// Health computed this tick.
    pub health: HealthSnapshot,
}

// ─── Shared View ────────────────────────────────────────────────────

struct Shared {
    registry: Arc<PumpRegistry>,
    sessions: Arc<Sessions>,
    sink: Arc<dyn EventSink>,
    state: RwLock<LoopState>,
    stats: Mutex<TickStats>,
}

impl Shared {
    fn publish_snapshot(
        &self,
        pumps: Vec<Pump>,
        system_health: HealthSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(), SinkError> {
        self.sink.publish(FleetEvent::DataUpdate(FleetSnapshot {
            pumps,
            system_health,
            users_online: self.sessions.online_count(),
            timestamp: now,
        }))
    }
}

/// Cloneable read and request access to a running monitor.
#[derive(Clone)]
pub struct MonitorHandle {
    shared: Arc<Shared>,
}

impl MonitorHandle {
    /// Publish a `data_update` with the current fleet state now.
    ///
    /// # Errors
    /// Returns the sink's error.
    pub fn request_data_update(&self) -> Result<(), SinkError> {
        let (pumps, health) = self
            .shared
            .registry
            .read_with_health(|pumps, health| (pumps.to_vec(), *health));
        self.shared.publish_snapshot(pumps, health, Utc::now())
    }

    /// Health computed on the latest successful tick.
    pub fn health(&self) -> HealthSnapshot {
        self.shared.registry.health()
    }

    /// Current loop state.
    pub fn state(&self) -> LoopState {
        *self.shared.state.read()
    }

    /// Tick counters.
    pub fn stats(&self) -> TickStats {
        *self.shared.stats.lock()
    }

    /// Fleet counters.
    pub fn fleet_stats(&self) -> FleetStats {
        let users_online = self.shared.sessions.online_count();
        self.shared
            .registry
            .read_with_health(|pumps, health| FleetStats::collect(pumps, *health, users_online))
    }

    /// Every active alert, critical first.
    pub fn fleet_alerts(&self) -> Vec<FleetAlert> {
        self.shared.registry.read(fleet_alerts)
    }
}

// ─── Monitor ────────────────────────────────────────────────────────

/// Periodic simulate, evaluate, score and publish loop.
pub struct Monitor {
    driver: Box<dyn TelemetryDriver>,
    shared: Arc<Shared>,
    base_period: Duration,
}

impl Monitor {
    /// Create a monitor.
    pub fn new(
        registry: Arc<PumpRegistry>,
        driver: Box<dyn TelemetryDriver>,
        sessions: Arc<Sessions>,
        sink: Arc<dyn EventSink>,
        base_period: Duration,
    ) -> Self {
        info!(
            "Monitor created with {} pumps, driver={} v{}, period={}ms",
            registry.len(),
            driver.name(),
            driver.version(),
            base_period.as_millis()
        );
        Self {
            driver,
            shared: Arc::new(Shared {
                registry,
                sessions,
                sink,
                state: RwLock::new(LoopState::RunningNormally),
                stats: Mutex::new(TickStats::default()),
            }),
            base_period,
        }
    }

    /// Handle for request workers.
    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Publish a `data_update` with the current fleet state now.
    ///
    /// # Errors
    /// Returns the sink's error.
    pub fn request_data_update(&self) -> Result<(), SinkError> {
        self.handle().request_data_update()
    }

    /// Current loop state.
    pub fn state(&self) -> LoopState {
        *self.shared.state.read()
    }

    /// Run one tick.
    ///
    /// # Errors
    /// - [`TickError::NonFinite`] if the driver produced a non-finite
    ///   reading; nothing is committed
    /// - [`TickError::Sink`] if publishing failed; the fleet is committed
    pub fn tick(&mut self) -> Result<TickReport, TickError> {
        let now = Utc::now();
        let driver = &mut self.driver;

        let (pumps, health) = self.shared.registry.update_with_health(|fleet, committed| {
            let mut next = fleet.to_vec();
            for pump in next.iter_mut() {
                driver.advance(pump, now);
                if let Some(metric) = pump.metrics.first_non_finite() {
                    return Err(TickError::NonFinite {
                        pump_id: pump.id,
                        metric,
                    });
                }
            }
            for pump in next.iter_mut() {
                pump.alerts = evaluate(pump, now);
            }
            let health = score(&next, now);
            fleet.clone_from_slice(&next);
            *committed = health;
            Ok((next, health))
        })?;

        let mut alerts = 0;
        for pump in &pumps {
            for alert in &pump.alerts {
                self.shared.sink.publish(FleetEvent::NewAlert(AlertRaised {
                    pump_id: pump.id,
                    pump_name: pump.name.clone(),
                    alert: alert.clone(),
                }))?;
                alerts += 1;
            }
        }
        self.shared.publish_snapshot(pumps, health, now)?;

        Ok(TickReport { alerts, health })
    }

    /// Run one tick, update the loop state and return the delay before the
    /// next one.
    pub fn step(&mut self) -> Duration {
        let started = Instant::now();
        let outcome = self.tick();
        let elapsed = started.elapsed();

        let stats = {
            let mut stats = self.shared.stats.lock();
            stats.record(elapsed, outcome.is_ok());
            *stats
        };

        let event = match &outcome {
            Ok(report) => {
                debug!(
                    "Tick {}: {} alerts, health {} ({}), {}us",
                    stats.tick_count,
                    report.alerts,
                    report.health.score,
                    report.health.status,
                    elapsed.as_micros()
                );
                LoopEvent::TickSucceeded
            }
            Err(e) => {
                error!(
                    "Monitoring tick {} failed ({} in a row): {}",
                    stats.tick_count, stats.consecutive_failures, e
                );
                LoopEvent::TickFailed
            }
        };

        let next = {
            let mut state = self.shared.state.write();
            let previous = *state;
            *state = previous.handle_event(event);
            if previous != *state {
                match *state {
                    LoopState::DegradedRetry => warn!(
                        "Monitor degraded, retrying every {}ms",
                        state.period(self.base_period).as_millis()
                    ),
                    LoopState::RunningNormally => info!("Monitor recovered"),
                }
            }
            *state
        };
        next.period(self.base_period)
    }

    /// Tick forever.
    pub async fn run(mut self) {
        info!(
            "Starting monitor loop (period={}ms)",
            self.base_period.as_millis()
        );
        loop {
            let delay = self.step();
            tokio::time::sleep(delay).await;
        }
    }
}
