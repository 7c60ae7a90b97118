//! Value types shared between the controller, its ports, and presentation.
//!
//! Everything here is `Copy` and recreated every cycle; the controller
//! keeps only the latest [`Reading`].

use core::fmt;

/// Maximum length of the operator-facing status line.
pub const STATUS_MESSAGE_LEN: usize = 48;

/// Fixed-capacity status text carried in snapshots.
pub type StatusMessage = heapless::String<STATUS_MESSAGE_LEN>;

// ---------------------------------------------------------------------------
// Sensor values
// ---------------------------------------------------------------------------

/// One successful sensor poll, before it is stamped with a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Air temperature (°C).
    pub temperature_c: f32,
    /// Relative humidity (%).
    pub humidity_pct: f32,
}

/// A measurement stamped with the monotonic time it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// Milliseconds since boot, from the [`Clock`](super::ports::Clock).
    pub observed_at_ms: u64,
}

impl Reading {
    pub fn new(measurement: Measurement, observed_at_ms: u64) -> Self {
        Self {
            temperature_c: measurement.temperature_c,
            humidity_pct: measurement.humidity_pct,
            observed_at_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller state axes
// ---------------------------------------------------------------------------

/// User-controlled master switch. Independent of the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    #[default]
    Off,
    On,
}

impl PowerState {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

/// Relay contact state. `Closed` energises the heating element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayState {
    #[default]
    Open,
    Closed,
}

impl RelayState {
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// A relay command issued to the [`ActuatorPort`](super::ports::ActuatorPort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    /// Close the contacts (heater on).
    Energise,
    /// Open the contacts (heater off).
    Release,
}

impl RelayCommand {
    /// Logical output level for `set_relay`.
    pub const fn energised(self) -> bool {
        matches!(self, Self::Energise)
    }

    /// Relay state reached once the command is applied.
    pub const fn resulting_state(self) -> RelayState {
        match self {
            Self::Energise => RelayState::Closed,
            Self::Release => RelayState::Open,
        }
    }

    /// Command that moves the relay into `state`.
    pub const fn to_reach(state: RelayState) -> Self {
        match state {
            RelayState::Closed => Self::Energise,
            RelayState::Open => Self::Release,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot for presentation
// ---------------------------------------------------------------------------

/// Read-only projection of controller state for the display.
///
/// Reading fields are `None` when no reading exists or the latest one is
/// stale; stale values are never shown as current.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub relay: RelayState,
    pub power: PowerState,
    pub target_c: f32,
    pub error_message: Option<StatusMessage>,
}

impl fmt::Display for ControllerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.temperature_c {
            Some(t) => write!(f, "T={t:.1}\u{00b0}C")?,
            None => write!(f, "T=--")?,
        }
        match self.humidity_pct {
            Some(h) => write!(f, " RH={h:.1}%")?,
            None => write!(f, " RH=--")?,
        }
        write!(
            f,
            " | target={:.1}\u{00b0}C | power={:?} relay={:?}",
            self.target_c, self.power, self.relay
        )?;
        if let Some(msg) = &self.error_message {
            write!(f, " | {msg}")?;
        }
        Ok(())
    }
}
