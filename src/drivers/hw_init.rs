//! One-shot hardware peripheral initialization.
//!
//! Configures the relay output and the three button inputs using raw
//! ESP-IDF sys calls, then installs the GPIO ISR service for the buttons.
//! Called once from `main()` before the event loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

/// Configure the relay output at its off level, then the button inputs.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(relay_active_low: bool) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the event loop; single-threaded.
    unsafe {
        init_relay_output(relay_active_low)?;
        init_button_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(_relay_active_low: bool) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── Relay output ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_relay_output(active_low: bool) -> Result<(), HwInitError> {
    let off_level = u32::from(crate::diagnostics::relay_off_level(active_low));
    // Latch the off level before switching the pin to output so the relay
    // never sees a glitch.
    unsafe { gpio_set_level(pins::RELAY_GPIO, off_level) };
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::RELAY_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as esp_err_t {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    unsafe { gpio_set_level(pins::RELAY_GPIO, off_level) };
    info!("hw_init: relay output on GPIO {} forced off", pins::RELAY_GPIO);
    Ok(())
}

// ── Button inputs ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_button_inputs() -> Result<(), HwInitError> {
    for &pin in &pins::BUTTON_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as esp_err_t {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }
    info!("hw_init: button inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on an already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: register write on a configured output pin; also used from
    // the panic hook, where no other code is running.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::button::button_isr_handler;
#[cfg(target_os = "espidf")]
use crate::events::ButtonId;

#[cfg(target_os = "espidf")]
fn isr_now_ms() -> u32 {
    // SAFETY: esp_timer_get_time is an RTC counter read; safe in ISR context.
    (unsafe { esp_timer_get_time() } / 1_000) as u32
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn power_button_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ButtonId::Power, isr_now_ms());
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn up_button_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ButtonId::Up, isr_now_ms());
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn down_button_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ButtonId::Down, isr_now_ms());
}

/// Install per-pin GPIO ISR service and register the button handlers.
/// Call after init_peripherals() and before the event loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    type Isr = unsafe extern "C" fn(*mut core::ffi::c_void);
    let handlers: [(i32, Isr); 3] = [
        (pins::BUTTON_POWER_GPIO, power_button_isr),
        (pins::BUTTON_UP_GPIO, up_button_isr),
        (pins::BUTTON_DOWN_GPIO, down_button_isr),
    ];

    // SAFETY: ESP_ERR_INVALID_STATE means the service is already installed.
    // The handlers only store a timestamp into an atomic.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as esp_err_t && ret != ESP_ERR_INVALID_STATE as esp_err_t {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        for (pin, isr) in handlers {
            gpio_set_intr_type(pin, gpio_int_type_t_GPIO_INTR_NEGEDGE);
            gpio_isr_handler_add(pin, Some(isr), core::ptr::null_mut());
            gpio_intr_enable(pin);
        }
    }
    info!("hw_init: ISR service installed (power, up, down)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
