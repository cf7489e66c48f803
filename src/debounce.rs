//! Refractory-window debounce for manual switches.
//!
//! Each registered input pin remembers its last accepted level and the
//! instant of its last accepted change.  A sample taken less than
//! [`REFRACTORY_MS`] after that change is ignored outright, whatever its
//! level: contact bounce settles well inside the window.
//!
//! | Switch kind | Actionable edges |
//! |-------------|------------------|
//! | Momentary   | Rising only      |
//! | Toggle      | Rising + falling |

use heapless::Vec;
use log::debug;

use crate::clock::Millis;
use crate::config::{DeviceConfig, MAX_DEVICES, SwitchKind};

/// Minimum time between two accepted level changes on one pin.
pub const REFRACTORY_MS: Millis = 250;

/// A qualifying level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Debounce state of one input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchState {
    pub last_level: bool,
    pub last_change_ms: Millis,
}

#[derive(Debug, Clone)]
struct Input {
    pin: u8,
    kind: SwitchKind,
    state: SwitchState,
}

/// Debounce gate for every provisioned switch.
#[derive(Debug, Clone, Default)]
pub struct DebounceGate {
    inputs: Vec<Input, MAX_DEVICES>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the switch of every device in the provisioning table.
    pub fn from_devices(devices: &[DeviceConfig]) -> Self {
        let mut gate = Self::new();
        for dev in devices {
            gate.register(dev.switch_pin, dev.switch_kind);
        }
        gate
    }

    /// Start tracking a pin.  Inputs start low with no prior change.
    /// Returns `false` if the pin is already tracked or the table is full.
    pub fn register(&mut self, pin: u8, kind: SwitchKind) -> bool {
        if self.find(pin).is_some() {
            return false;
        }
        self.inputs
            .push(Input {
                pin,
                kind,
                state: SwitchState {
                    last_level: false,
                    last_change_ms: 0,
                },
            })
            .is_ok()
    }

    /// Feed one raw sample.  Returns the edge if the level change qualifies.
    ///
    /// Unregistered pins never report an edge.
    pub fn poll(&mut self, pin: u8, level: bool, now_ms: Millis) -> Option<Edge> {
        let idx = self.find(pin)?;
        let state = &mut self.inputs[idx].state;

        if now_ms.saturating_sub(state.last_change_ms) < REFRACTORY_MS {
            return None;
        }
        if level == state.last_level {
            return None;
        }

        state.last_level = level;
        state.last_change_ms = now_ms;
        debug!("Debounce: pin {} -> {}", pin, if level { "high" } else { "low" });

        Some(if level { Edge::Rising } else { Edge::Falling })
    }

    /// Like [`poll`](Self::poll), but only returns edges that should act on
    /// the relay for this pin's [`SwitchKind`].
    pub fn poll_actionable(&mut self, pin: u8, level: bool, now_ms: Millis) -> Option<Edge> {
        let edge = self.poll(pin, level, now_ms)?;
        let kind = self.inputs[self.find(pin)?].kind;
        match (kind, edge) {
            (SwitchKind::Momentary, Edge::Falling) => None,
            _ => Some(edge),
        }
    }

    /// Snapshot of a pin's debounce state.
    pub fn state(&self, pin: u8) -> Option<SwitchState> {
        self.find(pin).map(|i| self.inputs[i].state)
    }

    fn find(&self, pin: u8) -> Option<usize> {
        self.inputs.iter().position(|i| i.pin == pin)
    }
}
