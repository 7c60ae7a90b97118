//! Hardware adapter — bridges the relay driver to [`ActuatorPort`].
//!
//! The controller treats `set_relay` as infallible. A failed GPIO write is
//! a fatal hardware condition outside its semantics, so it is logged here
//! and counted; it is not retried.

use embedded_hal::digital::OutputPin;
use log::error;

use crate::app::ports::ActuatorPort;
use crate::drivers::relay::RelayDriver;

pub struct RelayAdapter<P: OutputPin> {
    relay: RelayDriver<P>,
    write_failures: u32,
}

impl<P: OutputPin> RelayAdapter<P> {
    pub fn new(relay: RelayDriver<P>) -> Self {
        Self {
            relay,
            write_failures: 0,
        }
    }

    /// Whether the relay is currently energised, as last commanded.
    pub fn is_energised(&self) -> bool {
        self.relay.is_energised()
    }

    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }
}

impl<P: OutputPin> ActuatorPort for RelayAdapter<P> {
    fn set_relay(&mut self, on: bool) {
        if let Err(e) = self.relay.set(on) {
            self.write_failures = self.write_failures.saturating_add(1);
            error!(
                "RELAY | failed to {}: {}",
                if on { "energise" } else { "release" },
                e
            );
        }
    }
}
