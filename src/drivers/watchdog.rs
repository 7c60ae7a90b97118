//! Task watchdog for the control loop.
//!
//! On ESP-IDF the loop task subscribes to the TWDT, which panics (and the
//! panic hook releases the relay) if the loop stops feeding it. On both
//! targets the watchdog also measures the longest gap between feeds, which
//! the diagnostics heartbeat reports.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;
use log::warn;

pub struct Watchdog {
    timeout_ms: u32,
    last_feed_ms: Option<u64>,
    max_gap_ms: u64,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the calling task.
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            last_feed_ms: None,
            max_gap_ms: 0,
            #[cfg(target_os = "espidf")]
            subscribed: Self::subscribe(timeout_ms),
        }
    }

    #[cfg(target_os = "espidf")]
    fn subscribe(timeout_ms: u32) -> bool {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: TWDT configuration from the loop task during init.
        let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
        if ret != ESP_OK as esp_err_t {
            warn!("Watchdog: reconfigure returned {} (already configured?)", ret);
        }
        // SAFETY: a null handle subscribes the calling task.
        let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
        if ret == ESP_OK as esp_err_t {
            info!("Watchdog: loop task subscribed ({}ms, panic on trigger)", timeout_ms);
            true
        } else {
            warn!("Watchdog: subscribe failed ({}), loop unguarded", ret);
            false
        }
    }

    /// Longest observed interval between two feeds.
    pub fn max_gap_ms(&self) -> u64 {
        self.max_gap_ms
    }

    /// Feed the watchdog at loop time `now_ms`.
    pub fn feed(&mut self, now_ms: u64) {
        if let Some(last) = self.last_feed_ms {
            let gap = now_ms.saturating_sub(last);
            if gap > self.max_gap_ms {
                self.max_gap_ms = gap;
                if gap > u64::from(self.timeout_ms / 2) {
                    warn!("Watchdog: loop stalled {}ms (timeout {}ms)", gap, self.timeout_ms);
                }
            }
        }
        self.last_feed_ms = Some(now_ms);

        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: called from the subscribed task.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for Watchdog {
    fn drop(&mut self) {
        if self.subscribed {
            // SAFETY: unsubscribes the task that subscribed in `new`.
            unsafe {
                esp_task_wdt_delete(core::ptr::null_mut());
            }
        }
    }
}
