//! Alarm reconciler.
//!
//! The remote data store keeps reminders in an ordered collection addressed
//! by index.  The store has no dequeue primitive and other writers share
//! it, so the reconciler deduplicates locally:
//!
//! ```text
//!   remote count changed ──▶ refresh_if_stale ──▶ active (fetch order)
//!                                                   │
//!   now_canonical ─────────▶ fire_due ◀─────────────┘
//!                               │
//!                               ▼
//!                           consumed (grows forever)
//! ```
//!
//! An index in `consumed` is never fetched into `active` again and never
//! fired again, whatever the remote collection says later.

use std::collections::BTreeSet;

use heapless::String;
use log::{debug, error, warn};

use crate::app::ports::DataStorePort;
use crate::clock::CanonicalTime;
use crate::error::{AlarmField, Error};

/// Maximum stored title length in bytes; longer titles are truncated.
pub const TITLE_LEN: usize = 64;

pub type AlarmTitle = String<TITLE_LEN>;

/// One scheduled reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    /// Position in the remote collection.
    pub index: u32,
    pub scheduled: CanonicalTime,
    pub title: AlarmTitle,
}

/// Outcome of one [`AlarmReconciler::refresh_if_stale`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Candidates appended to the active schedule.
    pub fetched: usize,
    /// Candidates discarded because a field fetch failed.
    pub failed: usize,
    /// Indices skipped because they are consumed or already scheduled.
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct AlarmReconciler {
    last_known_count: u32,
    consumed: BTreeSet<u32>,
    active: Vec<Alarm>,
}

impl AlarmReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_known_count(&self) -> u32 {
        self.last_known_count
    }

    /// Active schedule in fetch order.
    pub fn active(&self) -> &[Alarm] {
        &self.active
    }

    pub fn is_consumed(&self, index: u32) -> bool {
        self.consumed.contains(&index)
    }

    pub fn consumed_len(&self) -> usize {
        self.consumed.len()
    }

    /// Re-scan the remote collection if its count moved.
    ///
    /// Returns `None` when `remote_count` equals the last known count; no
    /// remote call is made in that case.
    pub fn refresh_if_stale(
        &mut self,
        remote_count: u32,
        store: &mut impl DataStorePort,
    ) -> Option<RefreshReport> {
        if remote_count == self.last_known_count {
            return None;
        }

        let mut report = RefreshReport::default();
        for index in 0..remote_count {
            if self.consumed.contains(&index) || self.active.iter().any(|a| a.index == index) {
                report.skipped += 1;
                continue;
            }
            match fetch_alarm(index, store) {
                Ok(alarm) => {
                    debug!("Alarms: scheduled #{} '{}' at {}", index, alarm.title, alarm.scheduled);
                    self.active.push(alarm);
                    report.fetched += 1;
                }
                Err(e @ Error::Remote(_)) => {
                    warn!("Alarms: #{} not fetched, {}", index, e);
                    report.failed += 1;
                }
                Err(e) => {
                    warn!("Alarms: {}", e);
                    report.failed += 1;
                }
            }
        }

        self.last_known_count = remote_count;
        Some(report)
    }

    /// Remove and return every active alarm scheduled for `now`.
    ///
    /// Matching is exact string equality on the canonical layout.
    pub fn fire_due(&mut self, now: &CanonicalTime) -> Vec<Alarm> {
        let mut fired = Vec::new();
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].scheduled != *now {
                i += 1;
                continue;
            }
            let alarm = self.active.remove(i);
            if self.consumed.insert(alarm.index) {
                fired.push(alarm);
            } else {
                error!("Alarms: {}", Error::InvariantViolation { index: alarm.index });
            }
        }
        fired
    }

    /// Drop an alarm without firing it.  The index is consumed either way,
    /// so a not-yet-fetched alarm is never picked up.
    pub fn dismiss(&mut self, index: u32) -> Option<Alarm> {
        self.consumed.insert(index);
        let pos = self.active.iter().position(|a| a.index == index)?;
        Some(self.active.remove(pos))
    }
}

fn fetch_alarm(index: u32, store: &mut impl DataStorePort) -> Result<Alarm, Error> {
    let title_raw = fetch_field(index, AlarmField::Title, store)?;
    let time_raw = fetch_field(index, AlarmField::Time, store)?;

    let title = truncate_title(title_raw.trim()).ok_or(Error::PartialFetch {
        index,
        field: AlarmField::Title,
    })?;
    let scheduled = CanonicalTime::parse(&time_raw).ok_or(Error::PartialFetch {
        index,
        field: AlarmField::Time,
    })?;

    Ok(Alarm {
        index,
        scheduled,
        title,
    })
}

fn fetch_field(
    index: u32,
    field: AlarmField,
    store: &mut impl DataStorePort,
) -> Result<std::string::String, Error> {
    store.alarm_field(index, field).map_err(|e| {
        debug!("Alarms: #{} {} fetch failed: {}", index, field, e);
        if e.is_transient() {
            Error::from(e)
        } else {
            Error::PartialFetch { index, field }
        }
    })
}

fn truncate_title(raw: &str) -> Option<AlarmTitle> {
    if raw.is_empty() {
        return None;
    }
    let mut end = raw.len().min(TITLE_LEN);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    let mut title = AlarmTitle::new();
    title.push_str(&raw[..end]).ok()?;
    Some(title)
}
