//! Sensor staleness supervision.
//!
//! The monitor remembers when the last successful reading was observed.
//! The controller asks it on every evaluation whether that reading is
//! still usable; once the deadline passes the controller performs the
//! safety shutdown.
//!
//! ## Startup window
//!
//! The monitor is seeded with the construction time, so a thermostat that
//! has never received a reading is not flagged stale immediately. A sensor
//! that is dead from boot therefore looks fresh for the first deadline
//! window. The heater still cannot run in that window: with no reading the
//! controller has no temperature to act on.

use log::warn;

/// Tracks the age of the most recent successful sensor reading.
#[derive(Debug, Clone)]
pub struct StalenessMonitor {
    deadline_ms: u64,
    last_success_ms: u64,
}

impl StalenessMonitor {
    /// Create a monitor whose last success is `now_ms`.
    pub fn new(deadline_ms: u64, now_ms: u64) -> Self {
        Self {
            deadline_ms,
            last_success_ms: now_ms,
        }
    }

    /// Record a successful reading observed at `now_ms`.
    ///
    /// Out-of-order timestamps (older than the current last success) are
    /// ignored so a late delivery never ages the monitor backwards.
    pub fn record_success(&mut self, now_ms: u64) {
        if now_ms < self.last_success_ms {
            warn!(
                "Staleness: ignoring out-of-order success at {}ms (last {}ms)",
                now_ms, self.last_success_ms
            );
            return;
        }
        self.last_success_ms = now_ms;
    }

    /// `true` once strictly more than the deadline has elapsed.
    pub fn is_stale(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) > self.deadline_ms
    }

    /// Milliseconds since the last success (saturating at zero).
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_success_ms)
    }

    /// Whole seconds since the last success, for status text and logs.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        self.elapsed_ms(now_ms) / 1000
    }

    pub fn last_success_ms(&self) -> u64 {
        self.last_success_ms
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }
}
