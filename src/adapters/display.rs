//! Front-panel presentation.
//!
//! Renders [`ControllerSnapshot`]s into the four panel labels:
//!
//! ```text
//!   temperature   "22.5°↑"   (arrow while the heater relay is closed)
//!   humidity      "41.0%"
//!   target        "24.0°"
//!   status        "E01 - No sensor data (190s)" or empty
//! ```
//!
//! Missing or stale readings render as `--`. The panel is mirrored to the
//! log whenever a label changes.

use core::fmt::Write as _;

use log::info;

use crate::app::events::AppEvent;
use crate::app::model::{ControllerSnapshot, PowerState, StatusMessage};
use crate::app::ports::EventSink;

pub type Label = heapless::String<16>;

/// Rendered panel text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelLabels {
    pub temperature: Label,
    pub humidity: Label,
    pub target: Label,
    pub status: StatusMessage,
    pub power_on: bool,
}

impl PanelLabels {
    pub fn render(snapshot: &ControllerSnapshot) -> Self {
        let mut labels = Self {
            power_on: snapshot.power == PowerState::On,
            ..Self::default()
        };
        // Labels are sized for the widest value; overflow only truncates.
        match snapshot.temperature_c {
            Some(t) => {
                let _ = write!(labels.temperature, "{t:.1}\u{00b0}");
            }
            None => {
                let _ = labels.temperature.push_str("--\u{00b0}");
            }
        }
        if snapshot.relay.is_closed() {
            let _ = labels.temperature.push('\u{2191}');
        }
        match snapshot.humidity_pct {
            Some(h) => {
                let _ = write!(labels.humidity, "{h:.1}%");
            }
            None => {
                let _ = labels.humidity.push_str("--%");
            }
        }
        let _ = write!(labels.target, "{:.1}\u{00b0}", snapshot.target_c);
        if let Some(msg) = &snapshot.error_message {
            labels.status = msg.clone();
        }
        labels
    }
}

/// [`EventSink`] that keeps the panel labels current.
#[derive(Debug, Default)]
pub struct DisplayAdapter {
    labels: PanelLabels,
    refreshes: u32,
}

impl DisplayAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &PanelLabels {
        &self.labels
    }

    /// Number of times the panel content actually changed.
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    fn show(&mut self, snapshot: &ControllerSnapshot) {
        let next = PanelLabels::render(snapshot);
        if next == self.labels {
            return;
        }
        self.labels = next;
        self.refreshes = self.refreshes.wrapping_add(1);
        info!(
            "PANEL | [{}] {} {} -> {} {}",
            if self.labels.power_on { "ON" } else { "OFF" },
            self.labels.temperature,
            self.labels.humidity,
            self.labels.target,
            self.labels.status
        );
    }
}

impl EventSink for DisplayAdapter {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(snapshot) | AppEvent::Status(snapshot) => self.show(snapshot),
            _ => {}
        }
    }
}
