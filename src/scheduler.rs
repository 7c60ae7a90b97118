//! Fixed-interval task scheduler.
//!
//! Replaces self-rescheduling timer callbacks with a small table of
//! repeating tasks driven by an explicit clock. The scheduler notifies a
//! [`SchedulerDelegate`] when a task comes due; the main loop implements
//! the delegate to push events into the event queue.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │   Clock ──now_ms──▶ Scheduler.tick() ──▶ SchedulerDelegate│
//! │                                         (pushes Event)   │
//! │                                              │           │
//! │                                              ▼           │
//! │                               ThermostatController.evaluate()
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Tasks fire at `start + first_delay + k * interval`. If the loop stalls
//! across several intervals the missed fires are dropped, never replayed
//! in a burst.

use crate::app::ports::SchedulerDelegate;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single repeating task.
#[derive(Debug, Clone)]
pub struct Schedule<T> {
    /// Human-readable label (e.g., "evaluate").
    pub label: &'static str,
    /// Period between fires (milliseconds, minimum 1).
    pub interval_ms: u64,
    /// Delay before the first fire, counted from `add()`.
    pub first_delay_ms: u64,
    /// Caller-defined tag passed back on fire.
    pub task: T,
    /// Whether this schedule is currently enabled.
    pub enabled: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent schedules (stack-allocated).
const MAX_SCHEDULES: usize = 4;

/// The scheduler engine.
///
/// Decoupled from the event system: when a task is due it invokes the
/// delegate rather than pushing events itself.
pub struct Scheduler<T> {
    schedules: [Option<ScheduleEntry<T>>; MAX_SCHEDULES],
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone)]
struct ScheduleEntry<T> {
    schedule: Schedule<T>,
    next_due_ms: u64,
}

impl<T: Copy> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
        }
    }

    /// Add a schedule at time `now_ms`. Returns the slot index, or `None` if full.
    pub fn add(&mut self, schedule: Schedule<T>, now_ms: u64) -> Option<usize> {
        let slot = self.schedules.iter().position(Option::is_none)?;
        info!(
            "Scheduler: added '{}' at slot {} (every {}ms, first after {}ms)",
            schedule.label, slot, schedule.interval_ms, schedule.first_delay_ms
        );
        let next_due_ms = now_ms.saturating_add(schedule.first_delay_ms);
        self.schedules[slot] = Some(ScheduleEntry {
            schedule,
            next_due_ms,
        });
        Some(slot)
    }

    /// Fire every task whose due time has been reached.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate<T>) {
        for entry in self.schedules.iter_mut().flatten() {
            if !entry.schedule.enabled || now_ms < entry.next_due_ms {
                continue;
            }

            delegate.on_schedule_fired(entry.schedule.label, entry.schedule.task);

            let interval = entry.schedule.interval_ms.max(1);
            entry.next_due_ms = entry.next_due_ms.saturating_add(interval);
            if entry.next_due_ms <= now_ms {
                let missed = (now_ms - entry.next_due_ms) / interval + 1;
                warn!(
                    "Scheduler: '{}' behind by {} interval(s), skipping",
                    entry.schedule.label, missed
                );
                entry.next_due_ms = now_ms.saturating_add(interval);
            }
        }
    }

    /// Milliseconds until the earliest enabled task is due (0 if overdue).
    ///
    /// The main loop sleeps no longer than this.
    pub fn next_due_in(&self, now_ms: u64) -> Option<u64> {
        self.schedules
            .iter()
            .flatten()
            .filter(|e| e.schedule.enabled)
            .map(|e| e.next_due_ms.saturating_sub(now_ms))
            .min()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
