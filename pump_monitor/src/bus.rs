//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the [`EventSink`] the binary hands to the monitor. Any
//! number of transport adapters subscribe and receive every [`FleetEvent`].
//! It is shared via `Arc<EventBus>`.

use std::sync::atomic::{AtomicBool, Ordering};

use pump::consts::DEFAULT_EVENT_CAPACITY;
use pump::event::{EventSink, FleetEvent, SinkError};
use tokio::sync::broadcast;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use pump_monitor::bus::EventBus;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// assert_eq!(bus.subscriber_count(), 1);
/// # drop(rx.try_recv());
/// ```
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<FleetEvent>,
    closed: AtomicBool,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            closed: AtomicBool::new(false),
        }
    }

    /// Subscribe to every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<FleetEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Refuse further events. Used during shutdown.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: FleetEvent) -> Result<(), SinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SinkError::Closed);
        }
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
        Ok(())
    }
}
