//! Two-point (bang-bang) heater control with a symmetric dead zone.
//!
//! The relay opens once the temperature rises strictly above
//! `target + band` and closes once it falls strictly below
//! `target - band`. Anything in between, boundaries included, keeps the
//! current state.

use crate::app::model::RelayState;

/// Hysteresis switching rule.
#[derive(Debug, Clone, Copy)]
pub struct Hysteresis {
    band: f32,
}

impl Hysteresis {
    pub fn new(band: f32) -> Self {
        Self { band }
    }

    /// Half-width of the dead zone (°C).
    pub fn band(&self) -> f32 {
        self.band
    }

    /// Relay state the heater should be in given the current state.
    ///
    /// A NaN temperature compares false both ways and keeps `current`.
    pub fn next_state(&self, current: RelayState, temperature: f32, target: f32) -> RelayState {
        match current {
            RelayState::Closed if temperature > target + self.band => RelayState::Open,
            RelayState::Open if temperature < target - self.band => RelayState::Closed,
            state => state,
        }
    }
}
