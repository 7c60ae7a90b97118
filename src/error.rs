//! Unified error types for the thermostat firmware.
//!
//! `Error` covers the failures that abort or degrade startup. Per-poll
//! sensor failures and safety faults have their own `Copy` types so they
//! pass through the poll worker queue and the controller without
//! allocation; they are logged where they occur and never escalate.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The relay output could not be driven.
    Actuator(ActuatorError),
    /// Peripheral or task initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Why a single poll of the sensor endpoint failed.
///
/// These never reach the controller; the poll worker logs and drops them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Connection could not be opened or the request timed out.
    Transport,
    /// The endpoint answered with a non-2xx status.
    HttpStatus(u16),
    /// Body was not valid JSON or lacked the expected fields.
    Decode,
    /// The endpoint reported its own read failure (`{"error": ...}`).
    Remote,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport failure"),
            Self::HttpStatus(code) => write!(f, "HTTP status {code}"),
            Self::Decode => write!(f, "malformed payload"),
            Self::Remote => write!(f, "sensor node reported an error"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Conditions that force power off and open the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyFault {
    /// No successful sensor reading within the staleness deadline.
    SensorStale,
}

impl SafetyFault {
    /// Operator-facing error code shown on the display.
    pub const fn code(self) -> &'static str {
        match self {
            Self::SensorStale => "E01",
        }
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorStale => write!(f, "No sensor data"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
