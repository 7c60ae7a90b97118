//! Thermostat controller — the hexagonal core.
//!
//! [`ThermostatController`] owns the power switch, target temperature,
//! relay state, the latest reading, and the staleness monitor. All I/O
//! flows through port traits injected at call sites, so the whole
//! controller is testable with mock adapters and a synthetic clock.
//!
//! ```text
//!  Reading ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!              │     ThermostatController      │
//! Command ───▶ │ Staleness · Hysteresis · Power│ ──▶ ActuatorPort
//!              └──────────────────────────────┘
//! ```
//!
//! ## Relay invariants
//!
//! - The relay is closed only while power is on. Every path that turns
//!   power off opens the relay first, inside the same call.
//! - The relay is open whenever the latest reading is stale.
//! - The actuator is commanded only when the relay state changes, so a
//!   single call issues at most one command.

use core::fmt::Write as _;

use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::control::hysteresis::Hysteresis;
use crate::error::SafetyFault;
use crate::safety::StalenessMonitor;

use super::commands::ThermostatCommand;
use super::events::AppEvent;
use super::model::{
    ControllerSnapshot, PowerState, Reading, RelayCommand, RelayState, StatusMessage,
};
use super::ports::{ActuatorPort, EventSink};

// ───────────────────────────────────────────────────────────────
// ThermostatController
// ───────────────────────────────────────────────────────────────

/// Stale-data fault latched by the last evaluation.
#[derive(Debug, Clone, Copy)]
struct ActiveFault {
    fault: SafetyFault,
    elapsed_secs: u64,
}

/// The controller orchestrates all domain logic.
pub struct ThermostatController {
    power: PowerState,
    relay: RelayState,
    target_c: f32,
    latest: Option<Reading>,
    staleness: StalenessMonitor,
    hysteresis: Hysteresis,
    fault: Option<ActiveFault>,
    evaluations: u64,
}

impl ThermostatController {
    /// Construct the controller at boot time `now_ms`.
    ///
    /// Power starts off and the relay is assumed open; the caller drives
    /// the physical relay off before constructing the controller.
    pub fn new(config: &SystemConfig, now_ms: u64) -> Self {
        Self {
            power: PowerState::Off,
            relay: RelayState::Open,
            target_c: config.initial_target_c,
            latest: None,
            staleness: StalenessMonitor::new(config.stale_after_ms(), now_ms),
            hysteresis: Hysteresis::new(config.hysteresis_band_c),
            fault: None,
            evaluations: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the initial state.
    pub fn start(&self, now_ms: u64, sink: &mut impl EventSink) {
        let snapshot = self.snapshot(now_ms);
        info!(
            "Controller started: target={:.1}\u{00b0}C band=\u{00b1}{:.1}\u{00b0}C stale_after={}s",
            self.target_c,
            self.hysteresis.band(),
            self.staleness.deadline_ms() / 1000
        );
        sink.emit(&AppEvent::Started(snapshot));
    }

    /// Fail-safe stop: release the relay unconditionally and switch off.
    ///
    /// Issues `set_relay(false)` even if the relay is believed open.
    pub fn shutdown(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_relay(false);
        let prev_relay = self.relay;
        self.relay = RelayState::Open;
        if prev_relay != RelayState::Open {
            sink.emit(&AppEvent::RelayChanged {
                from: prev_relay,
                to: RelayState::Open,
            });
        }
        self.set_power(PowerState::Off, sink);
        info!("Controller shutdown: relay released");
    }

    // ── Commands ──────────────────────────────────────────────

    /// Process a presentation command.
    pub fn handle_command(
        &mut self,
        cmd: ThermostatCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<RelayCommand> {
        match cmd {
            ThermostatCommand::TogglePower => self.toggle_power(hw, sink),
            ThermostatCommand::AdjustTarget(delta) => {
                self.adjust_target(delta, sink);
                None
            }
        }
    }

    /// Flip the power switch.
    ///
    /// Turning off releases a closed relay immediately. Turning on does not
    /// close it; the next [`evaluate`](Self::evaluate) decides.
    pub fn toggle_power(
        &mut self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<RelayCommand> {
        match self.power.toggled() {
            PowerState::Off => {
                let cmd = self.drive_relay(RelayState::Open, hw, sink);
                self.set_power(PowerState::Off, sink);
                cmd
            }
            PowerState::On => {
                self.set_power(PowerState::On, sink);
                None
            }
        }
    }

    /// Shift the target temperature. Unbounded by design.
    pub fn adjust_target(&mut self, delta_c: f32, sink: &mut impl EventSink) {
        self.target_c += delta_c;
        info!("Target temperature {:.1}\u{00b0}C", self.target_c);
        sink.emit(&AppEvent::TargetChanged(self.target_c));
    }

    /// Store a fresh reading and mark the sensor as alive.
    ///
    /// A reading older than the last accepted one, or older than the
    /// controller itself, is dropped so the held reading and the staleness
    /// clock always agree.
    pub fn ingest_reading(&mut self, reading: Reading) {
        if reading.observed_at_ms < self.staleness.last_success_ms() {
            debug!(
                "Dropping reading stamped {}ms, older than {}ms",
                reading.observed_at_ms,
                self.staleness.last_success_ms()
            );
            return;
        }
        self.latest = Some(reading);
        self.staleness.record_success(reading.observed_at_ms);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control evaluation at `now_ms`.
    ///
    /// Returns the relay command issued to `hw`, if the relay changed.
    pub fn evaluate(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<RelayCommand> {
        self.evaluations += 1;

        let cmd = if self.staleness.is_stale(now_ms) {
            self.enforce_stale_shutdown(now_ms, hw, sink)
        } else {
            self.clear_stale_fault(sink);
            self.regulate(hw, sink)
        };

        self.publish_status(now_ms, sink);
        cmd
    }

    /// Emit a [`Status`](AppEvent::Status) snapshot for presentation.
    pub fn publish_status(&self, now_ms: u64, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Status(self.snapshot(now_ms)));
    }

    // ── Queries ───────────────────────────────────────────────

    /// Project the current state for presentation.
    ///
    /// Reading values are withheld once they are stale.
    pub fn snapshot(&self, now_ms: u64) -> ControllerSnapshot {
        let fresh = self
            .latest
            .filter(|_| !self.staleness.is_stale(now_ms));
        ControllerSnapshot {
            temperature_c: fresh.map(|r| r.temperature_c),
            humidity_pct: fresh.map(|r| r.humidity_pct),
            relay: self.relay,
            power: self.power,
            target_c: self.target_c,
            error_message: self.fault.map(Self::status_message),
        }
    }

    pub fn power(&self) -> PowerState {
        self.power
    }

    pub fn relay(&self) -> RelayState {
        self.relay
    }

    pub fn target_c(&self) -> f32 {
        self.target_c
    }

    /// Latest reading regardless of age (diagnostics only).
    pub fn latest_reading(&self) -> Option<Reading> {
        self.latest
    }

    /// Active safety fault from the last evaluation, if any.
    pub fn fault(&self) -> Option<SafetyFault> {
        self.fault.map(|f| f.fault)
    }

    /// Total evaluations run since startup.
    pub fn evaluation_count(&self) -> u64 {
        self.evaluations
    }

    // ── Internal ──────────────────────────────────────────────

    fn enforce_stale_shutdown(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<RelayCommand> {
        let elapsed_secs = self.staleness.elapsed_secs(now_ms);
        warn!("Temperature sensor data older than {}s", elapsed_secs);

        if self.fault.is_none() {
            sink.emit(&AppEvent::SensorStale { elapsed_secs });
        }
        self.fault = Some(ActiveFault {
            fault: SafetyFault::SensorStale,
            elapsed_secs,
        });

        let cmd = self.drive_relay(RelayState::Open, hw, sink);
        if self.power == PowerState::On {
            error!("SAFETY: no sensor data for {}s, forcing power off", elapsed_secs);
            self.set_power(PowerState::Off, sink);
            sink.emit(&AppEvent::SafetyShutdown { elapsed_secs });
        }
        cmd
    }

    fn clear_stale_fault(&mut self, sink: &mut impl EventSink) {
        if self.fault.take().is_some() {
            info!("Sensor data fresh again, clearing stale fault");
            sink.emit(&AppEvent::SensorRecovered);
        }
    }

    fn regulate(
        &mut self,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<RelayCommand> {
        if self.power == PowerState::Off {
            return self.drive_relay(RelayState::Open, hw, sink);
        }
        // Startup window: no reading yet, nothing to regulate on.
        let reading = self.latest?;
        let next = self
            .hysteresis
            .next_state(self.relay, reading.temperature_c, self.target_c);
        self.drive_relay(next, hw, sink)
    }

    /// Command the relay into `state` if it is not already there.
    fn drive_relay(
        &mut self,
        state: RelayState,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<RelayCommand> {
        if self.relay == state {
            return None;
        }
        let cmd = RelayCommand::to_reach(state);
        hw.set_relay(cmd.energised());
        let prev = self.relay;
        self.relay = state;
        info!("Relay {}", if cmd.energised() { "on" } else { "off" });
        sink.emit(&AppEvent::RelayChanged { from: prev, to: state });
        Some(cmd)
    }

    fn set_power(&mut self, power: PowerState, sink: &mut impl EventSink) {
        if self.power == power {
            return;
        }
        let prev = self.power;
        self.power = power;
        info!("Power {}", if power == PowerState::On { "on" } else { "off" });
        sink.emit(&AppEvent::PowerChanged { from: prev, to: power });
    }

    fn status_message(active: ActiveFault) -> StatusMessage {
        let mut msg = StatusMessage::new();
        // Truncation on overflow is acceptable for a display line.
        let _ = write!(
            msg,
            "{} - {} ({}s)",
            active.fault.code(),
            active.fault,
            active.elapsed_secs
        );
        msg
    }
}
