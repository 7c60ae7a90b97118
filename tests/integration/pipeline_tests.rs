//! Integration tests: sensor adapter → poller → event queue → controller.
//!
//! Drives the same wiring the firmware main loop uses, but single-threaded
//! and against a synthetic clock, so whole minutes of operation run in
//! microseconds.

use thermostat::adapters::display::DisplayAdapter;
use thermostat::adapters::http_sensor::HttpSensorAdapter;
use thermostat::adapters::nvs::NvsConfigStore;
use thermostat::adapters::poller::SensorPoller;
use thermostat::app::commands::ThermostatCommand;
use thermostat::app::events::AppEvent;
use thermostat::app::model::{PowerState, RelayState};
use thermostat::app::ports::{ActuatorPort, Clock, ConfigPort, EventSink, SchedulerDelegate};
use thermostat::app::service::ThermostatController;
use thermostat::config::SystemConfig;
use thermostat::error::SensorError;
use thermostat::events::{ButtonId, Event, EventQueue};
use thermostat::scheduler::{Schedule, Scheduler};

use super::mock_hw::{ManualClock, MockRelay, RecordingSink};

const SENSOR_URL: &str = "http://192.168.1.50/";
const POLL_MS: u64 = 30_000;

fn live_sensor(temperature: f32) -> HttpSensorAdapter {
    let mut sensor = HttpSensorAdapter::new(SENSOR_URL, 5_000);
    sensor.respond_with(
        200,
        &format!(r#"{{"temperature": {temperature}, "humidity": 40.0}}"#),
    );
    sensor
}

fn dead_sensor() -> HttpSensorAdapter {
    HttpSensorAdapter::new(SENSOR_URL, 5_000)
}

/// Pushes evaluate ticks into the queue, like the firmware delegate.
struct TickDelegate<'a> {
    queue: &'a EventQueue,
}

impl SchedulerDelegate<()> for TickDelegate<'_> {
    fn on_schedule_fired(&mut self, _label: &'static str, _task: ()) {
        assert!(self.queue.push(Event::EvaluateTick));
    }
}

fn evaluate_schedule(config: &SystemConfig) -> Schedule<()> {
    Schedule {
        label: "evaluate",
        interval_ms: u64::from(config.evaluate_interval_ms),
        first_delay_ms: u64::from(config.evaluate_initial_delay_ms),
        task: (),
        enabled: true,
    }
}

/// Same dispatch as the firmware control loop.
fn dispatch(
    event: Event,
    now_ms: u64,
    step_c: f32,
    controller: &mut ThermostatController,
    hw: &mut impl ActuatorPort,
    sink: &mut impl EventSink,
) {
    match event {
        Event::ReadingReceived(reading) => controller.ingest_reading(reading),
        Event::PollFailed(_) | Event::StatusTick => {}
        Event::EvaluateTick => {
            controller.evaluate(now_ms, hw, sink);
        }
        Event::ButtonPressed(id) => {
            controller.handle_command(ThermostatCommand::for_button(id, step_c), hw, sink);
            controller.publish_status(now_ms, sink);
        }
    }
}

// ── Poller ────────────────────────────────────────────────────

#[test]
fn poller_stamps_readings_with_clock() {
    let clock = ManualClock::at(42_000);
    let queue = EventQueue::new();
    let mut poller = SensorPoller::new(live_sensor(21.5), &clock, POLL_MS);

    assert!(poller.poll_and_publish(&queue));
    match queue.pop() {
        Some(Event::ReadingReceived(r)) => {
            assert_eq!(r.temperature_c, 21.5);
            assert_eq!(r.humidity_pct, 40.0);
            assert_eq!(r.observed_at_ms, 42_000);
        }
        other => panic!("expected reading, got {:?}", other),
    }
}

#[test]
fn poll_failures_are_classified_and_leave_reading_untouched() {
    let clock = ManualClock::at(0);
    let config = SystemConfig::default();
    let mut controller = ThermostatController::new(&config, 0);
    let (mut hw, mut sink) = (MockRelay::new(), RecordingSink::new());

    let mut poller = SensorPoller::new(live_sensor(22.0), &clock, POLL_MS);
    if let Event::ReadingReceived(r) = poller.poll_once() {
        controller.ingest_reading(r);
    }
    let before = controller.latest_reading();
    assert!(before.is_some());

    let cases = [
        (500, r#"{"temperature": 30.0, "humidity": 40.0}"#, SensorError::HttpStatus(500)),
        (200, r#"{"error": "DHT read failed"}"#, SensorError::Remote),
        (200, "<html>", SensorError::Decode),
        (200, r#"{"temperature": 150.0, "humidity": 40.0}"#, SensorError::OutOfRange),
    ];
    for (status, body, expected) in cases {
        let mut sensor = dead_sensor();
        sensor.respond_with(status, body);
        let mut failing = SensorPoller::new(sensor, &clock, POLL_MS);
        clock.advance_secs(30);
        let event = failing.poll_once();
        assert_eq!(event, Event::PollFailed(expected));
        dispatch(event, clock.now_ms(), 0.5, &mut controller, &mut hw, &mut sink);
        assert_eq!(failing.failures(), 1);
    }

    let mut offline = SensorPoller::new(dead_sensor(), &clock, POLL_MS);
    assert_eq!(offline.poll_once(), Event::PollFailed(SensorError::Transport));
    assert_eq!(controller.latest_reading(), before);
}

// ── Full loop ─────────────────────────────────────────────────

#[test]
fn sensor_outage_shuts_heater_down_at_first_evaluation_past_deadline() {
    let config = SystemConfig::default();
    let clock = ManualClock::at(0);
    let queue = EventQueue::new();
    let mut controller = ThermostatController::new(&config, 0);
    let mut hw = MockRelay::new();
    let mut sink = (RecordingSink::new(), DisplayAdapter::new());
    let mut sched = Scheduler::new();
    sched.add(evaluate_schedule(&config), 0);
    let mut delegate = TickDelegate { queue: &queue };

    controller.start(0, &mut sink);
    controller.toggle_power(&mut hw, &mut sink);

    let mut poller = SensorPoller::new(live_sensor(20.0), &clock, POLL_MS);
    for t in (0..=400_000u64).step_by(1_000) {
        clock.set(t);
        if t == 150_000 {
            // Sensor node drops off the network; last good poll was at 120 s.
            poller = SensorPoller::new(dead_sensor(), &clock, POLL_MS);
        }
        if t % POLL_MS == 0 {
            assert!(poller.poll_and_publish(&queue));
        }
        sched.tick(t, &mut delegate);
        queue.drain(|event| dispatch(event, t, 0.5, &mut controller, &mut hw, &mut sink));

        if t < 305_000 {
            assert_eq!(controller.power(), PowerState::On, "still on at {t}");
        }
    }

    // Closed at the first evaluation (5 s), released at 305 s.
    assert_eq!(hw.calls, vec![true, false]);
    assert_eq!(controller.power(), PowerState::Off);
    assert_eq!(controller.relay(), RelayState::Open);
    assert_eq!(
        sink.0
            .count(|e| matches!(e, AppEvent::SafetyShutdown { elapsed_secs: 185 })),
        1
    );

    let panel = sink.1.labels();
    assert_eq!(panel.temperature.as_str(), "--\u{00b0}");
    assert!(panel.status.starts_with("E01 - No sensor data ("));
    assert!(!panel.power_on);
}

#[test]
fn reading_queued_before_controller_exists_is_not_regulated_on() {
    let config = SystemConfig::default();
    let clock = ManualClock::at(0);
    let queue = EventQueue::new();
    let mut poller = SensorPoller::new(live_sensor(18.0), &clock, POLL_MS);
    assert!(poller.poll_and_publish(&queue));

    // Controller comes up 10 s after the worker already published.
    clock.set(10_000);
    let mut controller = ThermostatController::new(&config, clock.now_ms());
    let mut hw = MockRelay::new();
    let mut sink = RecordingSink::new();
    controller.toggle_power(&mut hw, &mut sink);

    queue.drain(|event| dispatch(event, 10_000, 0.5, &mut controller, &mut hw, &mut sink));
    assert!(controller.latest_reading().is_none());

    for t in (10_000..=config.stale_after_ms() + 10_000).step_by(5_000) {
        controller.evaluate(t, &mut hw, &mut sink);
        assert_eq!(controller.relay(), RelayState::Open, "closed at {t}");
    }
    assert!(hw.calls.is_empty());
}

#[test]
fn recovery_clears_fault_but_power_needs_user() {
    let config = SystemConfig::default();
    let clock = ManualClock::at(0);
    let queue = EventQueue::new();
    let mut controller = ThermostatController::new(&config, 0);
    let (mut hw, mut sink) = (MockRelay::new(), RecordingSink::new());

    controller.toggle_power(&mut hw, &mut sink);
    clock.set(200_000);
    controller.evaluate(clock.now_ms(), &mut hw, &mut sink);
    assert_eq!(controller.power(), PowerState::Off);

    let mut poller = SensorPoller::new(live_sensor(19.0), &clock, POLL_MS);
    poller.poll_and_publish(&queue);
    clock.advance_secs(10);
    queue.push(Event::EvaluateTick);
    let now = clock.now_ms();
    queue.drain(|event| dispatch(event, now, 0.5, &mut controller, &mut hw, &mut sink));

    assert!(controller.fault().is_none());
    assert_eq!(controller.power(), PowerState::Off);
    assert!(hw.calls.is_empty());
    assert_eq!(
        sink.last_status().map(|s| s.temperature_c),
        Some(Some(19.0))
    );

    // The user switches back on; heating resumes on the next evaluation.
    queue.push(Event::ButtonPressed(ButtonId::Power));
    queue.push(Event::EvaluateTick);
    queue.drain(|event| dispatch(event, now, 0.5, &mut controller, &mut hw, &mut sink));
    assert_eq!(controller.power(), PowerState::On);
    assert_eq!(hw.calls, vec![true]);
}

#[test]
fn buttons_adjust_target_through_queue() {
    let config = SystemConfig::default();
    let queue = EventQueue::new();
    let mut controller = ThermostatController::new(&config, 0);
    let (mut hw, mut sink) = (MockRelay::new(), RecordingSink::new());

    for id in [ButtonId::Up, ButtonId::Up, ButtonId::Up, ButtonId::Down] {
        assert!(queue.push(Event::ButtonPressed(id)));
    }
    queue.drain(|event| {
        dispatch(event, 1_000, config.target_step_c, &mut controller, &mut hw, &mut sink)
    });

    assert_eq!(controller.target_c(), 25.0);
    assert_eq!(sink.last_status().map(|s| s.target_c), Some(25.0));
    assert!(hw.calls.is_empty());
}

// ── Persisted config ──────────────────────────────────────────

#[test]
fn stored_config_shapes_control_behaviour() {
    let nvs = NvsConfigStore::new().unwrap();
    let stored = SystemConfig {
        initial_target_c: 20.0,
        hysteresis_band_c: 1.0,
        stale_after_secs: 60,
        sensor_poll_interval_secs: 10,
        ..SystemConfig::default()
    };
    nvs.save(&stored).unwrap();
    let config = nvs.load().unwrap();

    let clock = ManualClock::at(0);
    let mut controller = ThermostatController::new(&config, 0);
    let (mut hw, mut sink) = (MockRelay::new(), RecordingSink::new());
    controller.toggle_power(&mut hw, &mut sink);
    assert_eq!(controller.target_c(), 20.0);

    // 19.5 is inside the wider band.
    let mut poller = SensorPoller::new(live_sensor(19.5), &clock, 10_000);
    if let Event::ReadingReceived(r) = poller.poll_once() {
        controller.ingest_reading(r);
    }
    assert_eq!(controller.evaluate(1_000, &mut hw, &mut sink), None);

    clock.set(2_000);
    let mut poller = SensorPoller::new(live_sensor(18.9), &clock, 10_000);
    if let Event::ReadingReceived(r) = poller.poll_once() {
        controller.ingest_reading(r);
    }
    controller.evaluate(2_000, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![true]);

    // Shorter deadline from the stored config.
    controller.evaluate(62_001, &mut hw, &mut sink);
    assert_eq!(controller.power(), PowerState::Off);
    assert_eq!(hw.calls, vec![true, false]);
}

#[test]
fn invalid_stored_config_falls_back_to_defaults() {
    let nvs = NvsConfigStore::new().unwrap();
    nvs.store_raw(br#"{"stale_after_secs": 0}"#);
    let config = nvs.load().unwrap_or_default();
    assert_eq!(config, SystemConfig::default());
}
