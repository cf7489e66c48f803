//! Relay synchroniser.
//!
//! Keeps the physical relay outputs and the cloud's view of each device in
//! step.  Two paths change a relay:
//!
//! - **Remote command**: the cloud asked for a state.  The output is
//!   driven to it and nothing is reported back (the cloud already knows).
//! - **Local trigger**: a debounced switch edge.  The output's *current*
//!   physical level is read, negated and written back, and the new logical
//!   state is returned so the caller can tell the cloud.
//!
//! Relay boards may be active-low; the logical "on" state is the physical
//! level XOR the device's polarity.

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::RelayPort;
use crate::config::{DeviceConfig, DeviceId, MAX_DEVICES};
use crate::error::{Error, Result};

/// Result of applying a remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub device: DeviceId,
    pub relay_pin: u8,
    pub on: bool,
    /// The command switched the emergency relay on.
    pub emergency: bool,
}

/// Outward state change caused by a local trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub device: DeviceId,
    pub on: bool,
    /// The trigger switched the emergency relay on.
    pub emergency: bool,
}

/// Maps device ids to relay pins and applies state transitions.
#[derive(Debug, Clone)]
pub struct RelaySynchronizer {
    devices: Vec<DeviceConfig, MAX_DEVICES>,
    emergency_pin: u8,
}

impl RelaySynchronizer {
    pub fn new(devices: &Vec<DeviceConfig, MAX_DEVICES>, emergency_pin: u8) -> Self {
        Self {
            devices: devices.clone(),
            emergency_pin,
        }
    }

    pub fn device(&self, id: &DeviceId) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.id == *id)
    }

    pub fn device_for_switch(&self, pin: u8) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.switch_pin == pin)
    }

    /// The device wired to the emergency relay, if provisioned.
    pub fn emergency_device(&self) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.relay_pin == self.emergency_pin)
    }

    pub fn devices(&self) -> &[DeviceConfig] {
        &self.devices
    }

    /// Drive every relay to logical off.
    pub fn drive_all_off(&self, relays: &mut impl RelayPort) {
        for dev in &self.devices {
            relays.set_relay_level(dev.relay_pin, physical_level(false, dev.relay_active_low));
        }
    }

    /// Apply a power command received from the cloud channel.
    ///
    /// An unknown device id is a configuration error: it is logged, no
    /// relay is touched.
    pub fn apply_remote_command(
        &self,
        id: &DeviceId,
        on: bool,
        relays: &mut impl RelayPort,
    ) -> Result<Ack> {
        let Some(dev) = self.device(id) else {
            warn!("Relay: command for unknown device '{}' dropped", id);
            return Err(Error::UnknownDevice);
        };

        relays.set_relay_level(dev.relay_pin, physical_level(on, dev.relay_active_low));
        info!("Relay: {} -> {} (commanded)", dev.id, if on { "on" } else { "off" });

        Ok(Ack {
            device: dev.id.clone(),
            relay_pin: dev.relay_pin,
            on,
            emergency: on && dev.relay_pin == self.emergency_pin,
        })
    }

    /// Toggle a relay in response to its manual switch.
    pub fn apply_local_trigger(
        &self,
        id: &DeviceId,
        relays: &mut impl RelayPort,
    ) -> Result<Notification> {
        let Some(dev) = self.device(id) else {
            warn!("Relay: trigger for unknown device '{}' dropped", id);
            return Err(Error::UnknownDevice);
        };

        let new_level = !relays.relay_level(dev.relay_pin);
        relays.set_relay_level(dev.relay_pin, new_level);
        let on = logical_state(new_level, dev.relay_active_low);
        info!("Relay: {} -> {} (switch)", dev.id, if on { "on" } else { "off" });

        Ok(Notification {
            device: dev.id.clone(),
            on,
            emergency: on && dev.relay_pin == self.emergency_pin,
        })
    }

    /// Current logical power state of a device.
    pub fn logical_state(&self, id: &DeviceId, relays: &mut impl RelayPort) -> Result<bool> {
        let dev = self.device(id).ok_or(Error::UnknownDevice)?;
        Ok(logical_state(
            relays.relay_level(dev.relay_pin),
            dev.relay_active_low,
        ))
    }
}

fn physical_level(on: bool, active_low: bool) -> bool {
    on != active_low
}

fn logical_state(level: bool, active_low: bool) -> bool {
    level != active_low
}
