//! Inbound commands to the controller.
//!
//! These represent actions requested by the presentation layer (buttons,
//! display touch targets) that the
//! [`ThermostatController`](super::service::ThermostatController)
//! interprets and acts upon.

use crate::events::ButtonId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThermostatCommand {
    /// Flip the master power switch.
    TogglePower,

    /// Shift the target temperature by the given delta (°C).
    AdjustTarget(f32),
}

impl ThermostatCommand {
    /// One step up, as bound to the "up" button.
    pub fn raise(step_c: f32) -> Self {
        Self::AdjustTarget(step_c)
    }

    /// One step down, as bound to the "down" button.
    pub fn lower(step_c: f32) -> Self {
        Self::AdjustTarget(-step_c)
    }

    /// Command bound to a front-panel button.
    pub fn for_button(button: ButtonId, step_c: f32) -> Self {
        match button {
            ButtonId::Power => Self::TogglePower,
            ButtonId::Up => Self::raise(step_c),
            ButtonId::Down => Self::lower(step_c),
        }
    }
}
