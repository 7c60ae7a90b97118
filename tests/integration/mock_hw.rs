//! Mock adapters for integration tests.
//!
//! Records every actuator call and emitted event so tests can assert on
//! the full history without touching real GPIO or the network.

use std::cell::Cell;
use std::collections::VecDeque;

use thermostat::app::events::AppEvent;
use thermostat::app::model::{ControllerSnapshot, Measurement, Reading};
use thermostat::app::ports::{ActuatorPort, Clock, EventSink, SensorPort};
use thermostat::error::SensorError;

// ── MockRelay ─────────────────────────────────────────────────

/// Records every `set_relay` call in order.
#[derive(Debug, Default)]
pub struct MockRelay {
    pub calls: Vec<bool>,
}

#[allow(dead_code)]
impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Physical state implied by the last command (released if never driven).
    pub fn energised(&self) -> bool {
        self.calls.last().copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl ActuatorPort for MockRelay {
    fn set_relay(&mut self, on: bool) {
        self.calls.push(on);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn last_status(&self) -> Option<&ControllerSnapshot> {
        self.events.iter().rev().find_map(|e| match e {
            AppEvent::Status(s) => Some(s),
            _ => None,
        })
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Synthetic clock advanced explicitly by the test.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(now_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    pub fn advance_secs(&self, secs: u64) -> u64 {
        self.now_ms.set(self.now_ms.get() + secs * 1_000);
        self.now_ms.get()
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

// ── ScriptedSensor ────────────────────────────────────────────

/// Returns queued outcomes in order, then transport failures.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    pub script: VecDeque<Result<Measurement, SensorError>>,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn push_ok(&mut self, temperature_c: f32) {
        self.script.push_back(Ok(Measurement {
            temperature_c,
            humidity_pct: 45.0,
        }));
    }

    pub fn push_err(&mut self, e: SensorError) {
        self.script.push_back(Err(e));
    }
}

impl SensorPort for ScriptedSensor {
    fn poll(&mut self) -> Result<Measurement, SensorError> {
        self.script.pop_front().unwrap_or(Err(SensorError::Transport))
    }
}

/// Reading at `t` °C observed at `at_ms`.
#[allow(dead_code)]
pub fn reading(temperature_c: f32, at_ms: u64) -> Reading {
    Reading {
        temperature_c,
        humidity_pct: 45.0,
        observed_at_ms: at_ms,
    }
}
