//! Heater relay driver.
//!
//! Generic over any `embedded_hal` output pin. The relay module on the
//! reference board is active-low (driving the line LOW energises the
//! coil); polarity is a constructor argument so callers always speak in
//! terms of energised / released.
//!
//! The relay is released on construction and again on drop.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::error::ActuatorError;

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    active_low: bool,
    energised: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take ownership of `pin` and drive it to the released level.
    pub fn new(pin: P, active_low: bool) -> Result<Self, ActuatorError> {
        let mut driver = Self {
            pin,
            active_low,
            energised: false,
        };
        driver.write_level(false)?;
        Ok(driver)
    }

    /// Energise (`true`) or release (`false`) the relay.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.write_level(on)?;
        self.energised = on;
        Ok(())
    }

    /// Last successfully commanded state.
    pub fn is_energised(&self) -> bool {
        self.energised
    }

    fn write_level(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = on != self.active_low;
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed)
    }
}

impl<P: OutputPin> Drop for RelayDriver<P> {
    fn drop(&mut self) {
        if self.write_level(false).is_err() {
            warn!("Relay: release on drop failed");
        }
    }
}

/// Output pin backed by the raw GPIO register path in `hw_init`.
///
/// The pin must already be configured as an output.
#[derive(Debug, Clone, Copy)]
pub struct RawOutputPin {
    gpio: i32,
}

impl RawOutputPin {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl embedded_hal::digital::ErrorType for RawOutputPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for RawOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        crate::drivers::hw_init::gpio_write(self.gpio, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        crate::drivers::hw_init::gpio_write(self.gpio, true);
        Ok(())
    }
}
