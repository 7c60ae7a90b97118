//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the thermostat: staleness
//! supervision, hysteresis switching, and the power/relay state machine.
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod model;
pub mod ports;
pub mod service;
