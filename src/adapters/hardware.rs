//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the switch inputs, relay outputs, the [`SensorHub`] and the
//! screen, exposing them through the board ports.  This is the only
//! module in the system that touches GPIO.  Pins are generic over the
//! `embedded-hal` digital traits so the same adapter drives ESP-IDF
//! `PinDriver`s on target and simulated pins in tests.
//!
//! [`SensorHub`]: crate::sensors::SensorHub

use embedded_hal::digital::{InputPin, StatefulOutputPin};
use heapless::Vec;
use log::warn;

use crate::app::ports::{ClimateReading, DisplayPort, RelayPort, SensorPort, SwitchPort};
use crate::config::MAX_DEVICES;

/// Concrete adapter that combines all board I/O behind port traits.
pub struct HardwareAdapter<I, O, S, D> {
    switches: Vec<(u8, I), MAX_DEVICES>,
    relays: Vec<(u8, O), MAX_DEVICES>,
    sensors: S,
    display: D,
}

impl<I, O, S, D> HardwareAdapter<I, O, S, D> {
    pub fn new(sensors: S, display: D) -> Self {
        Self {
            switches: Vec::new(),
            relays: Vec::new(),
            sensors,
            display,
        }
    }

    /// Attach a switch input.  Returns `false` if the pin is already
    /// attached or the table is full.
    pub fn add_switch(&mut self, gpio: u8, pin: I) -> bool {
        if self.switches.iter().any(|(g, _)| *g == gpio) {
            return false;
        }
        self.switches.push((gpio, pin)).is_ok()
    }

    /// Attach a relay output.  Returns `false` if the pin is already
    /// attached or the table is full.
    pub fn add_relay(&mut self, gpio: u8, pin: O) -> bool {
        if self.relays.iter().any(|(g, _)| *g == gpio) {
            return false;
        }
        self.relays.push((gpio, pin)).is_ok()
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

// ── SwitchPort implementation ─────────────────────────────────

impl<I: InputPin, O, S, D> SwitchPort for HardwareAdapter<I, O, S, D> {
    fn read_switch(&mut self, pin: u8) -> bool {
        let Some((_, input)) = self.switches.iter_mut().find(|(g, _)| *g == pin) else {
            warn!("GPIO {} is not an attached switch", pin);
            return false;
        };
        input.is_high().unwrap_or_else(|e| {
            warn!("GPIO {} read failed: {:?}", pin, e);
            false
        })
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl<I, O: StatefulOutputPin, S, D> RelayPort for HardwareAdapter<I, O, S, D> {
    fn relay_level(&mut self, pin: u8) -> bool {
        let Some((_, output)) = self.relays.iter_mut().find(|(g, _)| *g == pin) else {
            warn!("GPIO {} is not an attached relay", pin);
            return false;
        };
        output.is_set_high().unwrap_or_else(|e| {
            warn!("GPIO {} level read failed: {:?}", pin, e);
            false
        })
    }

    fn set_relay_level(&mut self, pin: u8, high: bool) {
        let Some((_, output)) = self.relays.iter_mut().find(|(g, _)| *g == pin) else {
            warn!("GPIO {} is not an attached relay", pin);
            return;
        };
        let res = if high {
            output.set_high()
        } else {
            output.set_low()
        };
        if let Err(e) = res {
            warn!("GPIO {} write failed: {:?}", pin, e);
        }
    }
}

// ── SensorPort / DisplayPort delegation ───────────────────────

impl<I, O, S: SensorPort, D> SensorPort for HardwareAdapter<I, O, S, D> {
    fn read_heart_rate(&mut self) -> f32 {
        self.sensors.read_heart_rate()
    }

    fn read_climate(&mut self) -> ClimateReading {
        self.sensors.read_climate()
    }
}

impl<I, O, S, D: DisplayPort> DisplayPort for HardwareAdapter<I, O, S, D> {
    fn render_status(&mut self, text: &str) {
        self.display.render_status(text);
    }

    fn render_alarm(&mut self, title: &str) {
        self.display.render_alarm(title);
    }
}
