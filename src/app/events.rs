//! Outbound application events.
//!
//! The [`ThermostatController`](super::service::ThermostatController)
//! emits these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them: log to
//! serial, refresh the display, etc.

use super::model::{ControllerSnapshot, PowerState, RelayState};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries initial snapshot).
    Started(ControllerSnapshot),

    /// The master power switch changed.
    PowerChanged { from: PowerState, to: PowerState },

    /// The relay was commanded into a new state.
    RelayChanged { from: RelayState, to: RelayState },

    /// The target temperature changed (°C).
    TargetChanged(f32),

    /// Sensor data went stale; `elapsed_secs` since the last good reading.
    SensorStale { elapsed_secs: u64 },

    /// Fresh sensor data is flowing again after a stale period.
    SensorRecovered,

    /// Power was forced off because sensor data went stale.
    SafetyShutdown { elapsed_secs: u64 },

    /// Periodic status for presentation.
    Status(ControllerSnapshot),
}
