//! Cross-context event queue.
//!
//! Events are produced by:
//! - The sensor poll worker thread (readings and poll failures)
//! - Button ISRs (debounced by the main loop before they get here)
//! - The scheduler delegate (evaluate and status ticks)
//!
//! Events are consumed by the main control loop, which owns the
//! [`ThermostatController`](crate::app::service::ThermostatController)
//! exclusively and processes them in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Poll worker │────▶│              │     │              │
//! │ Buttons     │────▶│  EventQueue  │────▶│  Main Loop   │
//! │ Scheduler   │────▶│  (lock-free) │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use heapless::mpmc::MpMcQueue;

use crate::app::model::Reading;
use crate::error::SensorError;

/// Maximum number of pending events. Must be a power of two.
pub const EVENT_QUEUE_CAP: usize = 16;

/// Which front-panel button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    Power,
    Up,
    Down,
}

/// System event types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    // ── Sensor data ───────────────────────────────────────
    /// The poll worker obtained a valid reading.
    ReadingReceived(Reading),
    /// A poll attempt failed. The previous reading stays in place.
    PollFailed(SensorError),

    // ── Control ───────────────────────────────────────────
    /// Periodic control evaluation is due.
    EvaluateTick,
    /// Periodic status refresh is due.
    StatusTick,

    // ── User input ────────────────────────────────────────
    /// Debounced short press on a front-panel button.
    ButtonPressed(ButtonId),
}

/// Bounded multi-producer queue of [`Event`]s.
///
/// Producers never block: a full queue drops the event and reports it.
pub struct EventQueue {
    inner: MpMcQueue<Event, EVENT_QUEUE_CAP>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            inner: MpMcQueue::new(),
        }
    }

    /// Push an event. Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        self.inner.enqueue(event).is_ok()
    }

    /// Pop the next event, if any.
    pub fn pop(&self) -> Option<Event> {
        self.inner.dequeue()
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }
}

/// Process-wide queue shared by the poll worker, ISRs, and the main loop.
pub static EVENTS: EventQueue = EventQueue::new();
