//! Panic fail-safe and runtime diagnostics.
//!
//! The panic hook drives the relay line to its de-energised level before
//! the default handler resets the chip, so a crash can never leave the
//! heater running. Runtime metrics are collected on the status tick and
//! written to the log as a heartbeat.

use core::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use log::{error, info};

/// Relay line captured for the panic hook. `-1` until installed.
static PANIC_RELAY_GPIO: AtomicI32 = AtomicI32::new(-1);
static PANIC_RELAY_ACTIVE_LOW: AtomicBool = AtomicBool::new(true);

/// GPIO level that de-energises a relay of the given polarity.
pub const fn relay_off_level(active_low: bool) -> bool {
    active_low
}

/// Drive the relay line off through the raw GPIO path.
///
/// Usable before any driver exists and from panic context.
pub fn force_relay_off(gpio: i32, active_low: bool) {
    crate::drivers::hw_init::gpio_write(gpio, relay_off_level(active_low));
}

/// Extract a printable reason from a panic payload.
pub fn panic_reason<'a>(payload: &'a (dyn core::any::Any + Send)) -> &'a str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

/// Install a panic hook that releases the relay before reset.
///
/// Must be called once during init, before the relay is ever energised.
pub fn install_panic_handler(relay_gpio: i32, active_low: bool) {
    PANIC_RELAY_GPIO.store(relay_gpio, Ordering::Release);
    PANIC_RELAY_ACTIVE_LOW.store(active_low, Ordering::Release);

    std::panic::set_hook(Box::new(|info| {
        let gpio = PANIC_RELAY_GPIO.load(Ordering::Acquire);
        if gpio >= 0 {
            force_relay_off(gpio, PANIC_RELAY_ACTIVE_LOW.load(Ordering::Acquire));
        }
        error!("PANIC: {}", panic_reason(info.payload()));
        if let Some(loc) = info.location() {
            error!("PANIC at {}:{}", loc.file(), loc.line());
        }
        error!("SAFETY | relay released by panic handler");
    }));
    info!("Panic handler installed (relay GPIO {})", relay_gpio);
}

/// Runtime diagnostics snapshot collected on the status tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeMetrics {
    pub uptime_secs: u64,
    pub evaluations: u64,
    pub readings: u32,
    pub poll_failures: u32,
    /// Longest control-loop gap seen by the watchdog.
    pub max_loop_gap_ms: u64,
    /// Relay writes the GPIO layer rejected.
    pub relay_write_failures: u32,
    pub heap_free: u32,
    pub heap_min_free: u32,
}

impl RuntimeMetrics {
    #[cfg(target_os = "espidf")]
    pub fn collect(
        uptime_secs: u64,
        evaluations: u64,
        readings: u32,
        poll_failures: u32,
        max_loop_gap_ms: u64,
        relay_write_failures: u32,
    ) -> Self {
        use esp_idf_svc::sys::*;
        // SAFETY: plain reads of heap allocator counters.
        let heap_free = unsafe { esp_get_free_heap_size() };
        let heap_min_free = unsafe { esp_get_minimum_free_heap_size() };
        Self {
            uptime_secs,
            evaluations,
            readings,
            poll_failures,
            max_loop_gap_ms,
            relay_write_failures,
            heap_free,
            heap_min_free,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn collect(
        uptime_secs: u64,
        evaluations: u64,
        readings: u32,
        poll_failures: u32,
        max_loop_gap_ms: u64,
        relay_write_failures: u32,
    ) -> Self {
        Self {
            uptime_secs,
            evaluations,
            readings,
            poll_failures,
            max_loop_gap_ms,
            relay_write_failures,
            heap_free: 0,
            heap_min_free: 0,
        }
    }

    /// Write the heartbeat line.
    pub fn log(&self) {
        info!(
            "DIAG | up={}s evals={} readings={} poll_failures={} loop_gap={}ms relay_write_failures={} heap={}/{}",
            self.uptime_secs,
            self.evaluations,
            self.readings,
            self.poll_failures,
            self.max_loop_gap_ms,
            self.relay_write_failures,
            self.heap_free,
            self.heap_min_free
        );
    }
}
