//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, mirror to a debug
//! channel, etc.

use serde::Serialize;

use crate::alarms::AlarmTitle;
use crate::config::DeviceId;
use crate::emergency::EmergencyReason;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started.
    Started { devices: usize },

    /// A remote power command was applied to a relay.
    RelayCommanded { device: DeviceId, on: bool },

    /// A manual switch toggled a relay.
    RelayToggled { device: DeviceId, on: bool },

    /// A heart-rate emergency switched the nurse-call relay on.
    NurseCalled { device: DeviceId },

    /// The alarm schedule was re-scanned against a new remote count.
    AlarmsRefreshed {
        remote_count: u32,
        fetched: usize,
        failed: usize,
    },

    /// An alarm reached its scheduled minute.
    AlarmFired { index: u32, title: AlarmTitle },

    /// An alarm was dismissed without firing.
    AlarmDismissed { index: u32 },

    /// The emergency condition was raised or re-armed.
    EmergencyRaised {
        reason: EmergencyReason,
        rearmed: bool,
    },

    /// The emergency window elapsed.
    EmergencyCleared,

    /// Periodic telemetry record.
    Telemetry(TelemetryRecord),
}

/// Patient/environment record published to the data store.
///
/// Sensor values that were unavailable this cycle are `None` rather than
/// NaN, so the serialised record stays valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub heart_rate_bpm: Option<f32>,
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub emergency: bool,
    /// Why the emergency is active; `None` while idle.
    pub emergency_reason: Option<EmergencyReason>,
    pub uptime_secs: u64,
}
