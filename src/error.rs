//! Unified error types for the CareLink firmware.
//!
//! A single `Error` enum that every core component converts into, keeping
//! the polling cycle's error handling uniform.  All variants are `Copy` so
//! they can be logged and carried through reports without allocation.
//!
//! None of these errors is fatal: the service logs them and either skips
//! the affected step for this cycle or drops the offending candidate.

use core::fmt;

use crate::app::ports::RemoteError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible core operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The data store could not be reached while reading an alarm field.
    /// Transient: the candidate is picked up again on a later scan.
    Remote(RemoteError),
    /// One field of an alarm candidate was missing or malformed.
    PartialFetch { index: u32, field: AlarmField },
    /// A command named a device id that is not in the provisioning table.
    UnknownDevice,
    /// A consumed alarm index was asked to fire again.
    InvariantViolation { index: u32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(e) => write!(f, "remote: {e}"),
            Self::PartialFetch { index, field } => {
                write!(f, "alarm {index}: {field} field missing or malformed")
            }
            Self::UnknownDevice => write!(f, "unknown device id"),
            Self::InvariantViolation { index } => {
                write!(f, "consumed alarm {index} asked to fire again")
            }
        }
    }
}

impl From<RemoteError> for Error {
    fn from(e: RemoteError) -> Self {
        Self::Remote(e)
    }
}

// ---------------------------------------------------------------------------
// Alarm fields
// ---------------------------------------------------------------------------

/// The two per-alarm fields held by the remote data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmField {
    Title,
    Time,
}

impl AlarmField {
    /// Key of the field inside an alarm record.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for AlarmField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
