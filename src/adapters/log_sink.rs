//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::emergency::EmergencyReason;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { devices } => {
                info!("START | devices={}", devices);
            }
            AppEvent::RelayCommanded { device, on } => {
                info!("RELAY | {} -> {} (cloud)", device, on_off(*on));
            }
            AppEvent::RelayToggled { device, on } => {
                info!("RELAY | {} -> {} (switch)", device, on_off(*on));
            }
            AppEvent::NurseCalled { device } => {
                warn!("RELAY | {} -> on (heart rate)", device);
            }
            AppEvent::AlarmsRefreshed {
                remote_count,
                fetched,
                failed,
            } => {
                info!(
                    "ALARM | refreshed count={} fetched={} failed={}",
                    remote_count, fetched, failed
                );
            }
            AppEvent::AlarmFired { index, title } => {
                info!("ALARM | #{} fired: {}", index, title);
            }
            AppEvent::AlarmDismissed { index } => {
                info!("ALARM | #{} dismissed", index);
            }
            AppEvent::EmergencyRaised { reason, rearmed } => {
                warn!(
                    "EMERG | {} ({})",
                    if *rearmed { "re-armed" } else { "raised" },
                    reason
                );
            }
            AppEvent::EmergencyCleared => {
                info!("EMERG | cleared");
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | HR={:?} | T={:?}\u{00b0}C | RH={:?}% | emergency={} ({}) | up={}s",
                    t.heart_rate_bpm,
                    t.temperature_c,
                    t.humidity_pct,
                    t.emergency,
                    t.emergency_reason.map_or("-", EmergencyReason::as_str),
                    t.uptime_secs,
                );
            }
        }
    }
}
