//! Display lease.
//!
//! The screen shows routine status unless a fired alarm holds it.  An
//! alarm notice takes the lease for [`ALARM_DISPLAY_WINDOW_MS`]; routine
//! refreshes are skipped until it runs out.

use log::debug;

use crate::clock::Millis;

/// How long an alarm notice owns the screen.
pub const ALARM_DISPLAY_WINDOW_MS: Millis = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Available,
    Busy { until: Millis },
}

#[derive(Debug, Clone, Default)]
pub struct DisplayLease {
    state: DisplayState,
}

impl DisplayLease {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    /// `true` iff `now` is at or past the end of any held lease.
    pub fn is_available(&self, now: Millis) -> bool {
        match self.state {
            DisplayState::Available => true,
            DisplayState::Busy { until } => now >= until,
        }
    }

    /// Take the screen for an alarm notice.  Fails while another notice
    /// still holds it.
    pub fn acquire(&mut self, now: Millis) -> bool {
        if !self.is_available(now) {
            return false;
        }
        self.state = DisplayState::Busy {
            until: now + ALARM_DISPLAY_WINDOW_MS,
        };
        debug!("Display: leased until {}", now + ALARM_DISPLAY_WINDOW_MS);
        true
    }

    /// Release an expired lease.
    pub fn tick(&mut self, now: Millis) {
        if matches!(self.state, DisplayState::Busy { until } if now >= until) {
            self.state = DisplayState::Available;
            debug!("Display: released");
        }
    }
}
