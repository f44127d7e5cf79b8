//! Bounded activity log.
//!
//! Entries are appended by the control handler and the session table. Once
//! the log holds `capacity` entries, each append evicts the oldest one. Ids
//! come from a counter that never resets, so they stay unique after
//! eviction.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use pump::activity::{ActivityCategory, ActivityLogEntry};
use pump::event::{EventSink, FleetEvent};
use pump::pump::PumpId;
use tracing::warn;

#[derive(Debug)]
struct Ring {
    entries: VecDeque<ActivityLogEntry>,
    next_id: u64,
}

/// Ring buffer of [`ActivityLogEntry`] that announces each append.
pub struct ActivityLog {
    ring: Mutex<Ring>,
    capacity: usize,
    sink: Arc<dyn EventSink>,
}

impl ActivityLog {
    /// Create an empty log. A zero capacity is raised to one.
    pub fn new(capacity: usize, sink: Arc<dyn EventSink>) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Mutex::new(Ring {
                entries: VecDeque::with_capacity(capacity),
                next_id: 1,
            }),
            capacity,
            sink,
        }
    }

    /// Append an entry and publish it as `new_activity`.
    ///
    /// A sink failure is logged; the entry stays in the log either way.
    pub fn append(
        &self,
        message: impl Into<String>,
        actor: impl Into<String>,
        category: ActivityCategory,
        pump_id: Option<PumpId>,
    ) -> ActivityLogEntry {
        let entry = {
            let mut ring = self.ring.lock();
            let entry = ActivityLogEntry {
                id: ring.next_id,
                message: message.into(),
                actor: actor.into(),
                category,
                pump_id,
                timestamp: Utc::now(),
            };
            ring.next_id += 1;
            if ring.entries.len() == self.capacity {
                ring.entries.pop_front();
            }
            ring.entries.push_back(entry.clone());
            entry
        };

        if let Err(e) = self.sink.publish(FleetEvent::NewActivity(entry.clone())) {
            warn!("Failed to publish activity {}: {}", entry.id, e);
        }
        entry
    }

    /// Most recent entries, newest first. `limit == 0` returns all.
    pub fn recent(&self, limit: usize) -> Vec<ActivityLogEntry> {
        let ring = self.ring.lock();
        let take = if limit == 0 {
            ring.entries.len()
        } else {
            limit
        };
        ring.entries.iter().rev().take(take).cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.ring.lock().entries.len()
    }

    /// Whether nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.ring.lock().entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
