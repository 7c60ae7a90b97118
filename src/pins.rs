//! GPIO pin assignments for the thermostat controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Heater relay (single-channel module, opto-isolated)
// ---------------------------------------------------------------------------

/// Digital output driving the relay module input. The stock module is
/// active-LOW; polarity comes from `SystemConfig::relay_active_low`.
pub const RELAY_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Front-panel buttons (active-low with pull-ups)
// ---------------------------------------------------------------------------

pub const BUTTON_POWER_GPIO: i32 = 5;
pub const BUTTON_UP_GPIO: i32 = 6;
pub const BUTTON_DOWN_GPIO: i32 = 7;

/// All button inputs, for bulk GPIO configuration.
pub const BUTTON_GPIOS: [i32; 3] = [BUTTON_POWER_GPIO, BUTTON_UP_GPIO, BUTTON_DOWN_GPIO];
