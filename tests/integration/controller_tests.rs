//! Integration tests: ThermostatController → relay + event sink.

use thermostat::app::commands::ThermostatCommand;
use thermostat::app::events::AppEvent;
use thermostat::app::model::{PowerState, RelayCommand, RelayState};
use thermostat::app::service::ThermostatController;
use thermostat::config::SystemConfig;
use thermostat::error::SafetyFault;

use super::mock_hw::{MockRelay, RecordingSink, reading};

fn controller() -> (ThermostatController, MockRelay, RecordingSink) {
    let ctl = ThermostatController::new(&SystemConfig::default(), 0);
    (ctl, MockRelay::new(), RecordingSink::new())
}

// ── End-to-end ────────────────────────────────────────────────

#[test]
fn heats_cools_then_fails_safe_when_sensor_goes_silent() {
    let (mut ctl, mut hw, mut sink) = controller();
    assert_eq!(ctl.target_c(), 24.0);
    assert_eq!(ctl.power(), PowerState::Off);

    ctl.toggle_power(&mut hw, &mut sink);
    assert_eq!(ctl.power(), PowerState::On);

    ctl.ingest_reading(reading(23.0, 10_000));
    assert_eq!(
        ctl.evaluate(10_000, &mut hw, &mut sink),
        Some(RelayCommand::Energise)
    );
    assert_eq!(ctl.relay(), RelayState::Closed);
    assert_eq!(hw.calls, vec![true]);

    ctl.ingest_reading(reading(25.0, 40_000));
    assert_eq!(
        ctl.evaluate(40_000, &mut hw, &mut sink),
        Some(RelayCommand::Release)
    );
    assert_eq!(ctl.relay(), RelayState::Open);
    assert_eq!(hw.calls, vec![true, false]);

    // 200 s without a reading.
    assert_eq!(ctl.evaluate(240_000, &mut hw, &mut sink), None);
    assert_eq!(hw.calls, vec![true, false], "already open: no repeat command");
    assert_eq!(ctl.power(), PowerState::Off);
    assert_eq!(ctl.fault(), Some(SafetyFault::SensorStale));

    let snap = ctl.snapshot(240_000);
    assert_eq!(snap.temperature_c, None);
    assert_eq!(snap.humidity_pct, None);
    assert_eq!(
        snap.error_message.as_deref(),
        Some("E01 - No sensor data (200s)")
    );
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SafetyShutdown { elapsed_secs: 200 })),
        1
    );
}

// ── Staleness ─────────────────────────────────────────────────

#[test]
fn stale_while_heating_releases_exactly_once() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.toggle_power(&mut hw, &mut sink);
    ctl.ingest_reading(reading(20.0, 1_000));
    ctl.evaluate(1_000, &mut hw, &mut sink);
    assert_eq!(ctl.relay(), RelayState::Closed);
    hw.clear();

    assert_eq!(
        ctl.evaluate(181_001, &mut hw, &mut sink),
        Some(RelayCommand::Release)
    );
    assert_eq!(hw.calls, vec![false]);
    assert_eq!(ctl.power(), PowerState::Off);

    // Staying stale issues nothing further.
    ctl.evaluate(191_001, &mut hw, &mut sink);
    ctl.evaluate(201_001, &mut hw, &mut sink);
    assert_eq!(hw.calls, vec![false]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SafetyShutdown { .. })),
        1
    );
}

#[test]
fn deadline_is_exclusive() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.toggle_power(&mut hw, &mut sink);
    ctl.ingest_reading(reading(20.0, 0));
    ctl.evaluate(180_000, &mut hw, &mut sink);
    assert_eq!(ctl.power(), PowerState::On, "exactly 180 s is still fresh");
    assert_eq!(ctl.relay(), RelayState::Closed);

    ctl.evaluate(180_001, &mut hw, &mut sink);
    assert_eq!(ctl.power(), PowerState::Off);
    assert_eq!(ctl.relay(), RelayState::Open);
}

#[test]
fn never_receiving_a_reading_goes_stale_after_boot_deadline() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.toggle_power(&mut hw, &mut sink);
    assert_eq!(ctl.evaluate(5_000, &mut hw, &mut sink), None);
    assert_eq!(ctl.power(), PowerState::On);
    ctl.evaluate(185_000, &mut hw, &mut sink);
    assert_eq!(ctl.power(), PowerState::Off);
    assert!(hw.calls.is_empty(), "relay never closed, nothing to release");
}

#[test]
fn user_can_power_on_while_stale_but_relay_stays_open() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.ingest_reading(reading(18.0, 0));
    ctl.evaluate(200_000, &mut hw, &mut sink);
    ctl.toggle_power(&mut hw, &mut sink);
    assert_eq!(ctl.power(), PowerState::On);

    ctl.evaluate(210_000, &mut hw, &mut sink);
    assert_eq!(ctl.relay(), RelayState::Open);
    assert_eq!(ctl.power(), PowerState::Off);
}

// ── Idempotence ───────────────────────────────────────────────

#[test]
fn repeated_evaluate_at_same_instant_commands_once() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.toggle_power(&mut hw, &mut sink);
    ctl.ingest_reading(reading(22.0, 5_000));
    assert!(ctl.evaluate(5_000, &mut hw, &mut sink).is_some());
    assert_eq!(ctl.evaluate(5_000, &mut hw, &mut sink), None);
    assert_eq!(hw.calls, vec![true]);
}

#[test]
fn dead_zone_holds_either_state() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.toggle_power(&mut hw, &mut sink);

    for (i, t) in [23.5, 24.0, 24.5, 23.8].into_iter().enumerate() {
        let at = 1_000 * (i as u64 + 1);
        ctl.ingest_reading(reading(t, at));
        assert_eq!(ctl.evaluate(at, &mut hw, &mut sink), None, "open at {t}");
    }

    ctl.ingest_reading(reading(23.49, 10_000));
    ctl.evaluate(10_000, &mut hw, &mut sink);
    assert_eq!(ctl.relay(), RelayState::Closed);

    for (i, t) in [23.5, 24.0, 24.5].into_iter().enumerate() {
        let at = 11_000 + 1_000 * i as u64;
        ctl.ingest_reading(reading(t, at));
        assert_eq!(ctl.evaluate(at, &mut hw, &mut sink), None, "closed at {t}");
    }

    ctl.ingest_reading(reading(24.51, 20_000));
    assert_eq!(
        ctl.evaluate(20_000, &mut hw, &mut sink),
        Some(RelayCommand::Release)
    );
}

// ── Power and target ──────────────────────────────────────────

#[test]
fn power_off_releases_immediately() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.toggle_power(&mut hw, &mut sink);
    ctl.ingest_reading(reading(20.0, 1_000));
    ctl.evaluate(1_000, &mut hw, &mut sink);

    assert_eq!(
        ctl.handle_command(ThermostatCommand::TogglePower, &mut hw, &mut sink),
        Some(RelayCommand::Release)
    );
    assert_eq!(hw.calls, vec![true, false]);
    assert_eq!(ctl.relay(), RelayState::Open);

    // Relay is released before power is reported off.
    let relay_idx = sink
        .events
        .iter()
        .rposition(|e| matches!(e, AppEvent::RelayChanged { to: RelayState::Open, .. }))
        .unwrap();
    let power_idx = sink
        .events
        .iter()
        .rposition(|e| matches!(e, AppEvent::PowerChanged { to: PowerState::Off, .. }))
        .unwrap();
    assert!(relay_idx < power_idx);
}

#[test]
fn target_is_unbounded() {
    let (mut ctl, mut hw, mut sink) = controller();
    for _ in 0..200 {
        ctl.handle_command(ThermostatCommand::raise(0.5), &mut hw, &mut sink);
    }
    assert_eq!(ctl.target_c(), 124.0);
    for _ in 0..300 {
        ctl.handle_command(ThermostatCommand::lower(0.5), &mut hw, &mut sink);
    }
    assert_eq!(ctl.target_c(), -26.0);
    assert!(hw.calls.is_empty());
}

#[test]
fn raised_target_takes_effect_on_next_evaluate() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.toggle_power(&mut hw, &mut sink);
    ctl.ingest_reading(reading(24.0, 1_000));
    assert_eq!(ctl.evaluate(1_000, &mut hw, &mut sink), None);

    ctl.adjust_target(1.0, &mut sink);
    assert!(hw.calls.is_empty(), "adjusting target never drives the relay");
    assert_eq!(
        ctl.evaluate(2_000, &mut hw, &mut sink),
        Some(RelayCommand::Energise)
    );
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_is_unconditional_and_repeatable() {
    let (mut ctl, mut hw, mut sink) = controller();
    ctl.shutdown(&mut hw, &mut sink);
    ctl.shutdown(&mut hw, &mut sink);
    assert_eq!(hw.calls, vec![false, false]);
    assert!(!hw.energised());
    assert_eq!(ctl.power(), PowerState::Off);
}

#[test]
fn start_announces_initial_snapshot() {
    let (ctl, _, mut sink) = controller();
    ctl.start(0, &mut sink);
    match sink.events.first() {
        Some(AppEvent::Started(s)) => {
            assert_eq!(s.power, PowerState::Off);
            assert_eq!(s.relay, RelayState::Open);
            assert_eq!(s.target_c, 24.0);
            assert_eq!(s.temperature_c, None);
        }
        other => panic!("expected Started, got {:?}", other),
    }
}
