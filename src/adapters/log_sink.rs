//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production). One line per event,
//! prefixed with a fixed tag so the serial log can be grepped.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug)]
pub struct LogEventSink {
    /// Only every n-th status snapshot is logged; 1 logs all of them.
    status_every: u32,
    status_seen: u32,
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::with_status_every(1)
    }

    /// Log only every `n`-th [`AppEvent::Status`] (other events always log).
    pub fn with_status_every(n: u32) -> Self {
        Self {
            status_every: n.max(1),
            status_seen: 0,
        }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(snapshot) => {
                info!("START | {}", snapshot);
            }
            AppEvent::PowerChanged { from, to } => {
                info!("POWER | {:?} -> {:?}", from, to);
            }
            AppEvent::RelayChanged { from, to } => {
                info!("RELAY | {:?} -> {:?}", from, to);
            }
            AppEvent::TargetChanged(target) => {
                info!("TARGET | {:.1}\u{00b0}C", target);
            }
            AppEvent::SensorStale { elapsed_secs } => {
                warn!("SENSOR | stale, last reading {}s ago", elapsed_secs);
            }
            AppEvent::SensorRecovered => {
                info!("SENSOR | recovered");
            }
            AppEvent::SafetyShutdown { elapsed_secs } => {
                error!(
                    "SAFETY | power forced off, no sensor data for {}s",
                    elapsed_secs
                );
            }
            AppEvent::Status(snapshot) => {
                self.status_seen = self.status_seen.wrapping_add(1);
                if self.status_seen % self.status_every == 0 {
                    info!("STATUS | {}", snapshot);
                }
            }
        }
    }
}
