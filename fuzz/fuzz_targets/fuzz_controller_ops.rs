//! Fuzz target: `ThermostatController` driven by arbitrary operations
//!
//! Each input byte pair is decoded into one operation (toggle, adjust,
//! reading, evaluate, shutdown) with a time step. After every operation:
//! - the relay is closed only while power is on
//! - the physical relay matches the controller's relay state
//! - a single operation issues at most one actuator command
//!
//! cargo fuzz run fuzz_controller_ops

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermostat::app::events::AppEvent;
use thermostat::app::model::{PowerState, Reading, RelayState};
use thermostat::app::ports::{ActuatorPort, EventSink};
use thermostat::app::service::ThermostatController;
use thermostat::config::SystemConfig;

#[derive(Default)]
struct Relay {
    calls: Vec<bool>,
}

impl ActuatorPort for Relay {
    fn set_relay(&mut self, on: bool) {
        self.calls.push(on);
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig::default();
    let mut ctl = ThermostatController::new(&config, 0);
    let mut hw = Relay::default();
    let mut sink = Discard;
    let mut now: u64 = 0;

    for pair in data.chunks_exact(2) {
        let (op, arg) = (pair[0], pair[1]);
        let before = hw.calls.len();
        match op % 6 {
            0 => {
                ctl.toggle_power(&mut hw, &mut sink);
            }
            1 => ctl.adjust_target(if arg & 1 == 0 { 0.5 } else { -0.5 }, &mut sink),
            2 | 3 => {
                now += u64::from(arg) * 1_000;
                ctl.ingest_reading(Reading {
                    temperature_c: 10.0 + f32::from(arg) / 10.0,
                    humidity_pct: 40.0,
                    observed_at_ms: now,
                });
            }
            4 => {
                now += u64::from(arg) * 1_000;
                ctl.evaluate(now, &mut hw, &mut sink);
            }
            _ => {
                ctl.shutdown(&mut hw, &mut sink);
            }
        }

        assert!(hw.calls.len() - before <= 1);
        if ctl.relay() == RelayState::Closed {
            assert_eq!(ctl.power(), PowerState::On);
        }
        assert_eq!(
            hw.calls.last().copied().unwrap_or(false),
            ctl.relay().is_closed()
        );
    }
});
