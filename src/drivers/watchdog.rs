//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the hub if the polling loop stalls.
//!
//! The polling loop calls [`Watchdog::feed`] once per cycle.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

/// Lower bound for the stall timeout.
pub const MIN_TIMEOUT_MS: u32 = 5_000;

/// Stall timeout for a given polling interval: fifty missed cycles,
/// never below [`MIN_TIMEOUT_MS`].
pub fn timeout_for(poll_interval_ms: u32) -> u32 {
    poll_interval_ms.saturating_mul(50).max(MIN_TIMEOUT_MS)
}

pub struct Watchdog {
    subscribed: bool,
    timeout_ms: u32,
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: plain FFI calls on the current task's TWDT entry.
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                warn!("Watchdog: reconfigure returned {} (may already be configured)", ret);
            }

            let ret = esp_task_wdt_add(core::ptr::null_mut());
            let subscribed = ret == ESP_OK;
            if subscribed {
                info!("Watchdog: subscribed ({} ms timeout, panic on trigger)", timeout_ms);
            } else {
                warn!("Watchdog: failed to subscribe ({})", ret);
            }

            Self {
                subscribed,
                timeout_ms,
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        info!("Watchdog(sim): no-op, {} ms", timeout_ms);
        if timeout_ms < MIN_TIMEOUT_MS {
            warn!("Watchdog(sim): timeout below {} ms", MIN_TIMEOUT_MS);
        }
        Self {
            subscribed: false,
            timeout_ms,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: resets the current task's TWDT entry.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
