//! Thermostat Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single-owner control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HttpSensorAdapter ─▶ SensorPoller (own thread) ─▶ EVENTS      │
//! │  RelayAdapter   LogEventSink   DisplayAdapter   NvsConfigStore │
//! │  (Actuator)     (EventSink)    (EventSink)      (ConfigPort)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │          ThermostatController (pure logic)             │    │
//! │  │  Staleness · Hysteresis · Power/Relay                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · Buttons · Watchdog              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

use thermostat::adapters::display::DisplayAdapter;
use thermostat::adapters::hardware::RelayAdapter;
use thermostat::adapters::http_sensor::HttpSensorAdapter;
use thermostat::adapters::log_sink::LogEventSink;
use thermostat::adapters::nvs::NvsConfigStore;
use thermostat::adapters::poller::SensorPoller;
use thermostat::adapters::time::MonotonicClock;
use thermostat::adapters::wifi::{self, WifiCredentials};
use thermostat::app::commands::ThermostatCommand;
use thermostat::app::ports::{ActuatorPort, Clock, ConfigPort, SchedulerDelegate};
use thermostat::app::service::ThermostatController;
use thermostat::config::SystemConfig;
use thermostat::diagnostics::{self, RuntimeMetrics};
use thermostat::drivers::button::ButtonDriver;
use thermostat::drivers::hw_init;
use thermostat::drivers::relay::{RawOutputPin, RelayDriver};
use thermostat::drivers::watchdog::Watchdog;
use thermostat::error::Error;
use thermostat::events::{ButtonId, EVENTS, Event};
use thermostat::pins;
use thermostat::scheduler::{Schedule, Scheduler};

/// Longest main loop sleep; bounds button latency.
const LOOP_PERIOD_MS: u64 = 20;
const WATCHDOG_TIMEOUT_MS: u32 = 10_000;
/// Diagnostics heartbeat period.
const DIAG_INTERVAL_MS: u64 = 60_000;
/// Only every n-th status snapshot reaches the serial log.
const STATUS_LOG_EVERY: u32 = 6;
const POLLER_STACK_SIZE: usize = 8 * 1024;

/// Tells the poll worker to exit after its current cycle.
static POLLER_STOP: AtomicBool = AtomicBool::new(false);

// ── Scheduler delegate ────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about the event system)
// to the event queue.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Evaluate,
    Diagnostics,
}

struct EventQueueDelegate;

impl SchedulerDelegate<Tick> for EventQueueDelegate {
    fn on_schedule_fired(&mut self, label: &'static str, task: Tick) {
        let event = match task {
            Tick::Evaluate => Event::EvaluateTick,
            Tick::Diagnostics => Event::StatusTick,
        };
        if !EVENTS.push(event) {
            warn!("Scheduler: event queue full, '{}' dropped", label);
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Thermostat v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = load_config().unwrap_or_else(|e| {
        warn!("{}, running with defaults", e);
        SystemConfig::default()
    });

    // ── 3. Relay off before anything else can happen ──────────
    diagnostics::install_panic_handler(pins::RELAY_GPIO, config.relay_active_low);
    hw_init::init_peripherals(config.relay_active_low).map_err(|e| {
        error!("HAL init failed: {}", e);
        Error::Init("GPIO configuration")
    })?;
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, buttons disabled", e);
    }
    let relay = RelayDriver::new(RawOutputPin::new(pins::RELAY_GPIO), config.relay_active_low)
        .map_err(Error::from)?;
    let mut hw = RelayAdapter::new(relay);

    // ── 4. Run until the control loop gives up ────────────────
    let outcome = run(&config, &mut hw);
    if let Err(e) = &outcome {
        error!("Control loop aborted: {:#}", e);
    }

    // ── 5. Fail-safe ──────────────────────────────────────────
    POLLER_STOP.store(true, Ordering::Release);
    hw.set_relay(false);
    info!("Relay released, exiting");
    outcome
}

fn load_config() -> thermostat::error::Result<SystemConfig> {
    let nvs = NvsConfigStore::new().map_err(|e| {
        warn!("NVS init failed: {}", e);
        Error::Config("NVS unavailable")
    })?;
    nvs.load().map_err(|e| {
        warn!("Stored config rejected: {}", e);
        Error::Config("stored config rejected")
    })
}

fn run(config: &SystemConfig, hw: &mut RelayAdapter<RawOutputPin>) -> Result<()> {
    // ── Network ───────────────────────────────────────────────
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    // Without WiFi every poll fails and the staleness guard keeps the
    // heater off, so a failed connect is not fatal.
    let _wifi = match WifiCredentials::from_build_env()
        .map_err(anyhow::Error::from)
        .and_then(|creds| wifi::connect_station(peripherals.modem, sysloop, &creds))
    {
        Ok(w) => Some(w),
        Err(e) => {
            error!("WiFi unavailable: {:#}", e);
            None
        }
    };

    // ── Controller + presentation ─────────────────────────────
    // Built before the poll worker so every published reading is stamped
    // at or after the controller's staleness seed.
    let clock = MonotonicClock::new();
    let mut sink = (
        LogEventSink::with_status_every(STATUS_LOG_EVERY),
        DisplayAdapter::new(),
    );
    let mut controller = ThermostatController::new(config, clock.now_ms());
    controller.start(clock.now_ms(), &mut sink);

    // ── Sensor poll worker ────────────────────────────────────
    let sensor = HttpSensorAdapter::new(&config.sensor_url, config.sensor_timeout_ms);
    let poller = SensorPoller::new(sensor, clock, config.sensor_poll_interval_ms());
    let poll_worker = std::thread::Builder::new()
        .name("sensor-poll".into())
        .stack_size(POLLER_STACK_SIZE)
        .spawn(move || poller.run(&EVENTS, &POLLER_STOP))?;
    info!("Polling {} every {}s", config.sensor_url, config.sensor_poll_interval_secs);

    let mut sched = Scheduler::new();
    let mut sched_delegate = EventQueueDelegate;
    let now = clock.now_ms();
    sched.add(
        Schedule {
            label: "evaluate",
            interval_ms: u64::from(config.evaluate_interval_ms),
            first_delay_ms: u64::from(config.evaluate_initial_delay_ms),
            task: Tick::Evaluate,
            enabled: true,
        },
        now,
    );
    sched.add(
        Schedule {
            label: "diagnostics",
            interval_ms: DIAG_INTERVAL_MS,
            first_delay_ms: DIAG_INTERVAL_MS,
            task: Tick::Diagnostics,
            enabled: true,
        },
        now,
    );

    let mut buttons = [
        ButtonDriver::new(ButtonId::Power, pins::BUTTON_POWER_GPIO),
        ButtonDriver::new(ButtonId::Up, pins::BUTTON_UP_GPIO),
        ButtonDriver::new(ButtonId::Down, pins::BUTTON_DOWN_GPIO),
    ];
    let mut watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    let mut readings: u32 = 0;
    let mut poll_failures: u32 = 0;

    info!("System ready. Entering control loop.");

    // ── Control loop ──────────────────────────────────────────
    loop {
        let now = clock.now_ms();

        for button in &mut buttons {
            if let Some(id) = button.tick(now as u32) {
                if !EVENTS.push(Event::ButtonPressed(id)) {
                    warn!("Button: event queue full, {:?} press dropped", id);
                }
            }
        }

        sched.tick(now, &mut sched_delegate);

        EVENTS.drain(|event| match event {
            Event::ReadingReceived(reading) => {
                readings = readings.wrapping_add(1);
                controller.ingest_reading(reading);
            }
            Event::PollFailed(_) => {
                // Already logged by the worker; staleness covers persistence.
                poll_failures = poll_failures.wrapping_add(1);
            }
            Event::EvaluateTick => {
                controller.evaluate(clock.now_ms(), hw, &mut sink);
            }
            Event::StatusTick => {
                RuntimeMetrics::collect(
                    now / 1_000,
                    controller.evaluation_count(),
                    readings,
                    poll_failures,
                    watchdog.max_gap_ms(),
                    hw.write_failures(),
                )
                .log();
            }
            Event::ButtonPressed(id) => {
                let cmd = ThermostatCommand::for_button(id, config.target_step_c);
                controller.handle_command(cmd, hw, &mut sink);
                controller.publish_status(clock.now_ms(), &mut sink);
            }
        });

        watchdog.feed(now);

        if poll_worker.is_finished() {
            error!("Sensor poll worker exited unexpectedly");
            break;
        }

        let idle_ms = sched
            .next_due_in(clock.now_ms())
            .map_or(LOOP_PERIOD_MS, |due| due.clamp(1, LOOP_PERIOD_MS));
        std::thread::sleep(Duration::from_millis(idle_ms));
    }

    controller.shutdown(hw, &mut sink);
    Err(Error::Init("sensor poll worker").into())
}
