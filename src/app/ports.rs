//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (GPIO banks, sensors, the screen, the cloud channel, the
//! remote data store) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware or the network directly.
//!
//! Adapters only ever receive values (`&str`, [`DeviceId`], copies of
//! records) from the core, never references into its schedule or gates.
//!
//! ## Failure contract
//!
//! Every remote call is best-effort and returns a typed [`RemoteError`].
//! Hardware ports are infallible at this boundary: a pin that cannot be
//! read reports low, a sensor that cannot be read reports "no reading".

use crate::app::events::TelemetryRecord;
use crate::clock::{CanonicalTime, Millis};
use crate::config::{DeviceId, SystemConfig};
use crate::error::AlarmField;

// ───────────────────────────────────────────────────────────────
// Board ports (driven adapter: hardware ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Manual switch inputs, addressed by GPIO number.
pub trait SwitchPort {
    /// Sample the raw (undebounced) level of an input pin.
    fn read_switch(&mut self, pin: u8) -> bool;
}

/// Relay outputs, addressed by GPIO number.
pub trait RelayPort {
    /// Current physical level of an output pin (`true` = high).
    fn relay_level(&mut self, pin: u8) -> bool;

    /// Drive an output pin to the given physical level.
    fn set_relay_level(&mut self, pin: u8, high: bool);
}

/// Temperature/humidity sample.  Both fields are NaN when the read failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl ClimateReading {
    pub const UNAVAILABLE: Self = Self {
        temperature_c: f32::NAN,
        humidity_pct: f32::NAN,
    };

    pub fn is_valid(&self) -> bool {
        self.temperature_c.is_finite() && self.humidity_pct.is_finite()
    }
}

/// Biometric and environmental sensors.
pub trait SensorPort {
    /// Heart rate in beats/min; `0.0` means no reading this cycle.
    fn read_heart_rate(&mut self) -> f32;

    /// Temperature and humidity, [`ClimateReading::UNAVAILABLE`] on failure.
    fn read_climate(&mut self) -> ClimateReading;
}

/// The shared text screen.
pub trait DisplayPort {
    /// Draw routine status content.
    fn render_status(&mut self, text: &str);

    /// Draw a fired-alarm notice.
    fn render_alarm(&mut self, title: &str);
}

/// Everything the polling cycle needs from the board, in one bound.
///
/// Taking one `&mut impl Board` avoids juggling several mutable borrows of
/// the same hardware adapter.
pub trait Board: SwitchPort + RelayPort + SensorPort + DisplayPort {}

impl<T: SwitchPort + RelayPort + SensorPort + DisplayPort> Board for T {}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic and wall-clock time.
pub trait TimePort {
    /// Milliseconds since boot.
    fn now_ms(&self) -> Millis;

    /// Local wall-clock time in the canonical alarm layout.
    /// `None` until the clock has been synchronised.
    fn now_canonical(&self) -> Option<CanonicalTime>;
}

// ───────────────────────────────────────────────────────────────
// Remote ports (driven adapter: domain ↔ network services)
// ───────────────────────────────────────────────────────────────

/// Outbound side of the cloud device-control channel.
///
/// The inbound side (`powerCommand`) arrives as an
/// [`AppCommand::Power`](super::commands::AppCommand::Power).
pub trait CloudPort {
    /// Report a locally caused power-state change of a device.
    fn send_power_state(&mut self, device: &DeviceId, on: bool) -> Result<(), RemoteError>;
}

/// Spoken / pushed notification to the care staff.
pub trait NotifierPort {
    fn announce(&mut self, message: &str) -> Result<(), RemoteError>;
}

/// Remote data store holding the alarm collection and patient records.
pub trait DataStorePort {
    /// Number of index slots ever allocated in the alarm collection.
    fn alarm_count(&mut self) -> Result<u32, RemoteError>;

    /// Read one field of the alarm at `index`.
    fn alarm_field(&mut self, index: u32, field: AlarmField) -> Result<String, RemoteError>;

    /// Remove the alarm at `index`.  Other indices keep their position.
    fn delete_alarm(&mut self, index: u32) -> Result<(), RemoteError>;

    /// Publish the latest telemetry record.
    fn set_telemetry(&mut self, record: &TelemetryRecord) -> Result<(), RemoteError>;

    /// Set or clear the patient's emergency flag and reason.
    fn set_emergency(&mut self, active: bool, reason: &str) -> Result<(), RemoteError>;
}

/// All network-facing collaborators, in one bound.
pub trait Remote: CloudPort + NotifierPort + DataStorePort {}

impl<T: CloudPort + NotifierPort + DataStorePort> Remote for T {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST call [`SystemConfig::validate`] before persisting.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from remote collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteError {
    /// The requested record does not exist.
    NotFound,
    /// The record exists but could not be read or decoded.
    ReadError,
    /// No network path to the service.
    Unreachable,
    /// The local outbound queue is full.
    QueueFull,
    /// The service refused the request.
    Rejected,
}

impl RemoteError {
    /// The path to the service failed, not the record itself.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Unreachable | Self::QueueFull)
    }
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Underlying storage is full.
    StorageFull,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::ReadError => write!(f, "read error"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::QueueFull => write!(f, "outbound queue full"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageFull => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
