//! Time primitives shared by the core.
//!
//! Two clocks run side by side:
//!
//! - [`Millis`]: monotonic milliseconds since boot, used for debounce,
//!   emergency expiry and the display lease.
//! - [`CanonicalTime`]: the wall-clock string the remote data store uses
//!   to schedule alarms.  Alarms fire on exact string equality, so the
//!   layout is a persisted contract and must match byte-for-byte.

use core::fmt::{self, Write};

use chrono::NaiveDateTime;
use heapless::String;

/// Monotonic milliseconds since boot.
pub type Millis = u64;

/// Length of the canonical layout `Www Mmm dd hh:mm:ss yyyy`.
pub const CANONICAL_LEN: usize = 24;

/// `asctime` layout with seconds pinned to `00`: the string is constant
/// for a whole minute, giving minute-level firing granularity.
const CANONICAL_FORMAT: &str = "%a %b %e %H:%M:00 %Y";

/// Layout a stored time is read back with before re-rendering.
const PARSE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Wall-clock instant in the canonical alarm-matching layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalTime(String<CANONICAL_LEN>);

impl CanonicalTime {
    /// Accept a time string fetched from the data store.
    ///
    /// Trailing line terminators are dropped (`asctime` appends `'\n'`).
    /// The rest must be a real date that renders back to the same bytes;
    /// anything else (other layouts, zero-padded days, non-zero seconds)
    /// could never match and is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim_end_matches(['\n', '\r']);
        if trimmed.len() != CANONICAL_LEN || !trimmed.is_ascii() {
            return None;
        }
        let dt = NaiveDateTime::parse_from_str(trimmed, PARSE_FORMAT).ok()?;
        Self::from_datetime(&dt).filter(|t| t.as_str() == trimmed)
    }

    /// Render a local date-time in the canonical layout.
    pub fn from_datetime(dt: &NaiveDateTime) -> Option<Self> {
        let mut s = String::new();
        write!(s, "{}", dt.format(CANONICAL_FORMAT)).ok()?;
        Some(Self(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CanonicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
