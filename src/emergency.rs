//! Emergency state machine.
//!
//! ```text
//!            raise(reason, t)
//!   ┌──────┐ ───────────────▶ ┌────────────────────┐ ─┐ raise: re-arm
//!   │ Idle │                  │ Active(reason, t)  │ ◀┘
//!   └──────┘ ◀─────────────── └────────────────────┘
//!             now - t >= 20 s
//! ```
//!
//! Expiry is the only way back to `Idle`; nothing acknowledges an
//! emergency from outside.  Remote side effects (flag, announcement) are
//! driven by the caller from the returned [`Transition`] and from
//! [`EmergencyMachine::tick`].

use log::{info, warn};
use serde::Serialize;

use crate::clock::Millis;

/// How long an emergency stays active after its last trigger.
pub const EMERGENCY_WINDOW_MS: Millis = 20_000;

/// Default heart-rate threshold in beats/min.
pub const DEFAULT_HEART_RATE_THRESHOLD: f32 = 110.0;

/// Serialises as the same text written to the data store's reason field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmergencyReason {
    /// Nurse-call relay switched on, locally or from the cloud.
    #[serde(rename = "manual call")]
    ManualCall,
    /// Heart rate above the configured threshold.
    #[serde(rename = "heartbeat high")]
    HeartRateHigh,
}

impl EmergencyReason {
    /// Text written to the data store's reason field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManualCall => "manual call",
            Self::HeartRateHigh => "heartbeat high",
        }
    }
}

impl core::fmt::Display for EmergencyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyState {
    Idle,
    Active { reason: EmergencyReason, raised_at: Millis },
}

/// What a [`EmergencyMachine::raise`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `Idle -> Active`.
    Entered,
    /// Already active; timer restarted.
    Rearmed { reason_changed: bool },
}

#[derive(Debug, Clone)]
pub struct EmergencyMachine {
    state: EmergencyState,
    threshold_bpm: f32,
}

impl Default for EmergencyMachine {
    fn default() -> Self {
        Self::new(DEFAULT_HEART_RATE_THRESHOLD)
    }
}

impl EmergencyMachine {
    pub fn new(threshold_bpm: f32) -> Self {
        Self {
            state: EmergencyState::Idle,
            threshold_bpm,
        }
    }

    pub fn state(&self) -> EmergencyState {
        self.state
    }

    /// Enter or re-arm the emergency window.
    pub fn raise(&mut self, reason: EmergencyReason, now: Millis) -> Transition {
        let transition = match self.state {
            EmergencyState::Idle => {
                warn!("Emergency: raised ({})", reason);
                Transition::Entered
            }
            EmergencyState::Active { reason: prev, .. } => {
                info!("Emergency: re-armed ({})", reason);
                Transition::Rearmed {
                    reason_changed: prev != reason,
                }
            }
        };
        self.state = EmergencyState::Active {
            reason,
            raised_at: now,
        };
        transition
    }

    /// Raise on a heart-rate sample above the threshold.
    ///
    /// `0.0` means "no reading" and never triggers, nor does a NaN.
    pub fn evaluate_heart_rate(&mut self, bpm: f32, now: Millis) -> Option<Transition> {
        if bpm.is_finite() && bpm > self.threshold_bpm {
            Some(self.raise(EmergencyReason::HeartRateHigh, now))
        } else {
            None
        }
    }

    /// Expire the window.  Returns `true` on the call that moved the state
    /// back to `Idle`.
    pub fn tick(&mut self, now: Millis) -> bool {
        match self.state {
            EmergencyState::Active { raised_at, .. }
                if now.saturating_sub(raised_at) >= EMERGENCY_WINDOW_MS =>
            {
                self.state = EmergencyState::Idle;
                info!("Emergency: window elapsed");
                true
            }
            _ => false,
        }
    }

    /// Whether the emergency is active at `now`, independent of `tick`.
    pub fn is_active_at(&self, now: Millis) -> bool {
        match self.state {
            EmergencyState::Idle => false,
            EmergencyState::Active { raised_at, .. } => {
                now.saturating_sub(raised_at) < EMERGENCY_WINDOW_MS
            }
        }
    }

    pub fn reason(&self) -> Option<EmergencyReason> {
        match self.state {
            EmergencyState::Idle => None,
            EmergencyState::Active { reason, .. } => Some(reason),
        }
    }
}
