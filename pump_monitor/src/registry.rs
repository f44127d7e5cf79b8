//! Pump registry.
//!
//! The registry is the only shared mutable state of the monitor. It holds
//! the fleet and the health computed from it behind one coarse `RwLock`:
//!
//! - readers clone under the read lock, so every snapshot is consistent
//!   across all fields of every pump, and a score read alongside the pumps
//!   was computed from exactly the alerts they carry;
//! - a single-pump command and a whole monitoring tick each run under the
//!   write lock, so mutations of the same pump never interleave.
//!
//! Closures passed to the `update*` methods must stay CPU-only. Event
//! publication happens after the lock is released.

use chrono::Utc;
use parking_lot::RwLock;
use pump::health::HealthSnapshot;
use pump::pump::{Pump, PumpId};
use tracing::warn;

#[derive(Debug)]
struct FleetState {
    /// Pumps ordered by id, ids unique.
    pumps: Vec<Pump>,
    /// Score of the latest committed tick.
    health: HealthSnapshot,
}

/// Fleet state shared between the monitoring loop and request workers.
#[derive(Debug)]
pub struct PumpRegistry {
    state: RwLock<FleetState>,
}

impl Default for PumpRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PumpRegistry {
    /// Build a registry from the startup fleet.
    ///
    /// Pumps are ordered by id. If two pumps share an id, the first one wins.
    /// Health starts at the pre-tick placeholder.
    pub fn new(mut pumps: Vec<Pump>) -> Self {
        pumps.sort_by_key(|p| p.id);
        let before = pumps.len();
        pumps.dedup_by_key(|p| p.id);
        if pumps.len() != before {
            warn!(
                "Dropped {} pumps with duplicate ids",
                before - pumps.len()
            );
        }
        Self {
            state: RwLock::new(FleetState {
                pumps,
                health: HealthSnapshot::initial(Utc::now()),
            }),
        }
    }

    /// Number of registered pumps.
    pub fn len(&self) -> usize {
        self.state.read().pumps.len()
    }

    /// Whether the fleet is empty.
    pub fn is_empty(&self) -> bool {
        self.state.read().pumps.is_empty()
    }

    /// Copy of every pump, ordered by id.
    pub fn snapshot(&self) -> Vec<Pump> {
        self.state.read().pumps.clone()
    }

    /// Latest committed health.
    pub fn health(&self) -> HealthSnapshot {
        self.state.read().health
    }

    /// Copy of one pump.
    pub fn get(&self, id: PumpId) -> Option<Pump> {
        let state = self.state.read();
        position(&state.pumps, id).map(|idx| state.pumps[idx].clone())
    }

    /// Run `f` against one pump under the write lock.
    ///
    /// Returns `None` if no pump has the id.
    pub fn update<T>(&self, id: PumpId, f: impl FnOnce(&mut Pump) -> T) -> Option<T> {
        let mut state = self.state.write();
        let idx = position(&state.pumps, id)?;
        Some(f(&mut state.pumps[idx]))
    }

    /// Run `f` against the whole fleet under the write lock.
    pub fn update_all<T>(&self, f: impl FnOnce(&mut [Pump]) -> T) -> T {
        let mut state = self.state.write();
        f(&mut state.pumps)
    }

    /// Run `f` against the whole fleet and its health under the write lock.
    pub fn update_with_health<T>(
        &self,
        f: impl FnOnce(&mut [Pump], &mut HealthSnapshot) -> T,
    ) -> T {
        let mut guard = self.state.write();
        let state = &mut *guard;
        f(&mut state.pumps, &mut state.health)
    }

    /// Run `f` against a read-locked view of the fleet.
    pub fn read<T>(&self, f: impl FnOnce(&[Pump]) -> T) -> T {
        let state = self.state.read();
        f(&state.pumps)
    }

    /// Run `f` against a read-locked view of the fleet and its health.
    pub fn read_with_health<T>(&self, f: impl FnOnce(&[Pump], &HealthSnapshot) -> T) -> T {
        let state = self.state.read();
        f(&state.pumps, &state.health)
    }
}

fn position(pumps: &[Pump], id: PumpId) -> Option<usize> {
    pumps.binary_search_by_key(&id, |p| p.id).ok()
}
