//! System configuration parameters
//!
//! The provisioning table (which cloud device id drives which relay and
//! which manual switch) plus the tunable intervals of the polling cycle.
//! Values can be overridden via NVS.
//!
//! Safety-relevant timing (debounce refractory window, emergency window,
//! alarm display window) is fixed policy and lives as constants in the
//! owning components, not here.

use core::fmt;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Maximum number of relay/switch device pairs.
pub const MAX_DEVICES: usize = 8;

/// Capacity of a device identifier (cloud ids are 24 hex characters).
pub const DEVICE_ID_LEN: usize = 32;

/// Device shipped in the factory table.
const DEFAULT_DEVICE_ID: &str = "645e4cd6929949c1da656545";

/// GPIO of the nurse-call relay.
pub const DEFAULT_EMERGENCY_PIN: u8 = 32;

// ---------------------------------------------------------------------------
// Device identity
// ---------------------------------------------------------------------------

/// Opaque cloud device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String<DEVICE_ID_LEN>);

impl DeviceId {
    /// Returns `None` for empty or over-long identifiers.
    pub fn new(id: &str) -> Option<Self> {
        if id.is_empty() {
            return None;
        }
        let mut s = String::new();
        s.push_str(id).ok()?;
        Some(Self(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a manual input behaves electrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchKind {
    /// Tactile push button: only the press (rising edge) toggles the relay.
    Momentary,
    /// Latching flip switch: every position change toggles the relay.
    Toggle,
}

/// One row of the provisioning table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: DeviceId,
    /// Output GPIO driving the relay coil.
    pub relay_pin: u8,
    /// Input GPIO of the manual switch.
    pub switch_pin: u8,
    pub switch_kind: SwitchKind,
    /// Relay board energises on a low level.
    pub relay_active_low: bool,
}

// ---------------------------------------------------------------------------
// System configuration
// ---------------------------------------------------------------------------

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Provisioning ---
    /// Relay/switch pairs known to the cloud channel.
    pub devices: Vec<DeviceConfig, MAX_DEVICES>,
    /// Relay pin whose remote "on" command raises an emergency.
    pub emergency_relay_pin: u8,

    // --- Emergency ---
    /// Heart rate (beats/min) above which an emergency is raised.
    pub heart_rate_threshold_bpm: f32,

    // --- Timing ---
    /// Polling cycle interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Minimum interval between routine status redraws (milliseconds)
    pub status_refresh_ms: u32,
    /// Telemetry upload interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut devices = Vec::new();
        if let Some(id) = DeviceId::new(DEFAULT_DEVICE_ID) {
            let _ = devices.push(DeviceConfig {
                id,
                relay_pin: DEFAULT_EMERGENCY_PIN,
                switch_pin: 17,
                switch_kind: SwitchKind::Momentary,
                relay_active_low: true,
            });
        }

        Self {
            devices,
            emergency_relay_pin: DEFAULT_EMERGENCY_PIN,

            heart_rate_threshold_bpm: 110.0,

            poll_interval_ms: 100,        // 10 Hz
            status_refresh_ms: 1000,      // 1 Hz
            telemetry_interval_secs: 30,
        }
    }
}

impl SystemConfig {
    /// Range- and consistency-check every field.
    ///
    /// Invalid values are rejected, never clamped: a provisioning mistake
    /// must not silently rewire a relay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, dev) in self.devices.iter().enumerate() {
            if dev.relay_pin == dev.switch_pin {
                return Err(ConfigError::ValidationFailed(
                    "relay_pin and switch_pin must differ",
                ));
            }
            for other in &self.devices[i + 1..] {
                if other.id == dev.id {
                    return Err(ConfigError::ValidationFailed("duplicate device id"));
                }
                if other.relay_pin == dev.relay_pin {
                    return Err(ConfigError::ValidationFailed("duplicate relay_pin"));
                }
                if other.switch_pin == dev.switch_pin {
                    return Err(ConfigError::ValidationFailed("duplicate switch_pin"));
                }
                if other.switch_pin == dev.relay_pin || other.relay_pin == dev.switch_pin {
                    return Err(ConfigError::ValidationFailed(
                        "a pin is both a relay and a switch",
                    ));
                }
            }
        }
        if !self.devices.is_empty()
            && !self
                .devices
                .iter()
                .any(|d| d.relay_pin == self.emergency_relay_pin)
        {
            return Err(ConfigError::ValidationFailed(
                "emergency_relay_pin matches no device",
            ));
        }
        if !(40.0..=250.0).contains(&self.heart_rate_threshold_bpm) {
            return Err(ConfigError::ValidationFailed(
                "heart_rate_threshold_bpm must be 40–250",
            ));
        }
        if !(10..=1000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be 10–1000",
            ));
        }
        if !(100..=60_000).contains(&self.status_refresh_ms) {
            return Err(ConfigError::ValidationFailed(
                "status_refresh_ms must be 100–60000",
            ));
        }
        if !(5..=3600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 5–3600",
            ));
        }
        Ok(())
    }
}
