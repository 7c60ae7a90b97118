//! System configuration parameters
//!
//! All tunable parameters for the thermostat. Defaults reproduce the
//! behaviour of the reference build; values can be overridden
//! from NVS through the [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Control ---
    /// Target temperature at boot (Celsius). Not persisted when changed.
    pub initial_target_c: f32,
    /// Increment applied by one up/down button press (Celsius)
    pub target_step_c: f32,
    /// Half-width of the dead zone around the target (Celsius)
    pub hysteresis_band_c: f32,

    // --- Safety ---
    /// Age of the last good reading after which the heater is shut down
    pub stale_after_secs: u32,

    // --- Timing ---
    /// Sensor poll interval (seconds)
    pub sensor_poll_interval_secs: u32,
    /// Control evaluation interval (milliseconds)
    pub evaluate_interval_ms: u32,
    /// Delay before the first evaluation after boot (milliseconds)
    pub evaluate_initial_delay_ms: u32,

    // --- Sensor endpoint ---
    /// URL answering `GET` with `{"temperature": .., "humidity": ..}`
    pub sensor_url: String,
    /// HTTP request timeout (milliseconds)
    pub sensor_timeout_ms: u32,

    // --- Relay ---
    /// Relay module energises on a LOW output level
    pub relay_active_low: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Control
            initial_target_c: 24.0,
            target_step_c: 0.5,
            hysteresis_band_c: 0.5,

            // Safety
            stale_after_secs: 180,

            // Timing
            sensor_poll_interval_secs: 30,
            evaluate_interval_ms: 10_000,
            evaluate_initial_delay_ms: 5_000,

            // Sensor endpoint
            sensor_url: String::from("http://localhost:8080"),
            sensor_timeout_ms: 5_000,

            // Relay
            relay_active_low: true,
        }
    }
}

impl SystemConfig {
    /// Staleness deadline in milliseconds.
    pub fn stale_after_ms(&self) -> u64 {
        u64::from(self.stale_after_secs) * 1000
    }

    /// Sensor poll interval in milliseconds.
    pub fn sensor_poll_interval_ms(&self) -> u64 {
        u64::from(self.sensor_poll_interval_secs) * 1000
    }

    /// Range-check every field.
    ///
    /// Invalid values are rejected, never clamped: a config that disables
    /// the staleness shutdown must not be accepted silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_target_c.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "initial_target_c must be finite",
            ));
        }
        if !(0.1..=5.0).contains(&self.target_step_c) {
            return Err(ConfigError::ValidationFailed(
                "target_step_c must be 0.1–5.0",
            ));
        }
        if !(0.1..=5.0).contains(&self.hysteresis_band_c) {
            return Err(ConfigError::ValidationFailed(
                "hysteresis_band_c must be 0.1–5.0",
            ));
        }
        if !(30..=3600).contains(&self.stale_after_secs) {
            return Err(ConfigError::ValidationFailed(
                "stale_after_secs must be 30–3600",
            ));
        }
        if !(1..=600).contains(&self.sensor_poll_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "sensor_poll_interval_secs must be 1–600",
            ));
        }
        if self.sensor_poll_interval_secs >= self.stale_after_secs {
            return Err(ConfigError::ValidationFailed(
                "sensor_poll_interval_secs must be < stale_after_secs",
            ));
        }
        if !(100..=600_000).contains(&self.evaluate_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "evaluate_interval_ms must be 100–600000",
            ));
        }
        if self.evaluate_initial_delay_ms > 600_000 {
            return Err(ConfigError::ValidationFailed(
                "evaluate_initial_delay_ms must be <= 600000",
            ));
        }
        if !(self.sensor_url.starts_with("http://") || self.sensor_url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(
                "sensor_url must start with http:// or https://",
            ));
        }
        if !(100..=60_000).contains(&self.sensor_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "sensor_timeout_ms must be 100–60000",
            ));
        }
        Ok(())
    }
}
