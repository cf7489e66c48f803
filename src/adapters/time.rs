//! System clock adapter.
//!
//! - **`target_os = "espidf"`**: monotonic time from `esp_timer_get_time()`
//!   (microsecond precision since boot).
//! - **`not(target_os = "espidf")`**: `std::time::Instant` for host-side
//!   testing and simulation.
//!
//! Wall-clock time comes from the C library on both targets (SNTP sets
//! it on the device); the `TZ` environment variable selects local time.

use chrono::{Datelike, Local};

use crate::app::ports::TimePort;
use crate::clock::{CanonicalTime, Millis};

/// Years before this mean the RTC has not been set yet.
const MIN_SYNCED_YEAR: i32 = 2020;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> Millis {
        // SAFETY: reads the free-running high-resolution timer; no state.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as Millis / 1000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as Millis
    }

    /// Whether the wall clock has been synchronised.
    pub fn is_synced(&self) -> bool {
        Local::now().year() >= MIN_SYNCED_YEAR
    }
}

impl TimePort for SystemClock {
    fn now_ms(&self) -> Millis {
        self.uptime_ms()
    }

    fn now_canonical(&self) -> Option<CanonicalTime> {
        let now = Local::now();
        if now.year() < MIN_SYNCED_YEAR {
            return None;
        }
        CanonicalTime::from_datetime(&now.naive_local())
    }
}
