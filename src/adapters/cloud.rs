//! Cloud device-control channel bridge.
//!
//! The cloud client delivers `powerCommand` callbacks from its own task.
//! Those are queued into a bounded `embassy-sync` channel and drained by
//! the polling loop.  Outbound power-state reports and announcements go
//! the other way through a second channel, drained by the network task.
//!
//! ```text
//! ┌──────────────┐  AppCommand  ┌──────────────┐
//! │ Cloud client │────────────▶│ Polling loop  │
//! │  (callback)  │◀────────────│  (sync)       │
//! └──────────────┘  OutboundMsg └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;
use log::warn;

use crate::app::commands::AppCommand;
use crate::app::ports::{CloudPort, NotifierPort, RemoteError};
use crate::config::DeviceId;

/// Channel depth for inbound commands.
pub const COMMAND_DEPTH: usize = 8;

/// Channel depth for outbound messages.
pub const OUTBOUND_DEPTH: usize = 16;

/// Longest announcement carried on the channel.
pub const ANNOUNCEMENT_LEN: usize = 96;

/// Message for the network task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMsg {
    /// `powerStateChanged(deviceId, on)`.
    PowerState { device: DeviceId, on: bool },
    /// Text for the smart-speaker notifier.
    Announce(String<ANNOUNCEMENT_LEN>),
}

pub type CommandChannel = Channel<CriticalSectionRawMutex, AppCommand, COMMAND_DEPTH>;
pub type OutboundChannel = Channel<CriticalSectionRawMutex, OutboundMsg, OUTBOUND_DEPTH>;

/// Inbound command channel: cloud client → polling loop.
pub static COMMAND_CHANNEL: CommandChannel = Channel::new();

/// Outbound channel: polling loop → network task.
pub static OUTBOUND_CHANNEL: OutboundChannel = Channel::new();

/// Both ends of the cloud channel pair.
#[derive(Clone, Copy)]
pub struct CloudBridge<'a> {
    commands: &'a CommandChannel,
    outbound: &'a OutboundChannel,
}

impl CloudBridge<'static> {
    /// Bridge over the process-wide channels.
    pub fn global() -> Self {
        Self::new(&COMMAND_CHANNEL, &OUTBOUND_CHANNEL)
    }
}

impl<'a> CloudBridge<'a> {
    pub fn new(commands: &'a CommandChannel, outbound: &'a OutboundChannel) -> Self {
        Self { commands, outbound }
    }

    /// Entry point for the client's `powerCommand` callback.
    ///
    /// Returns `false` if the id is not a valid device id or the queue is
    /// full; the client reports that back to the cloud as a failure.
    pub fn on_power_command(&self, device_id: &str, on: bool) -> bool {
        let Some(device) = DeviceId::new(device_id) else {
            warn!("Cloud: malformed device id '{}' rejected", device_id);
            return false;
        };
        self.submit_command(AppCommand::Power { device, on })
    }

    /// Queue an inbound command.  Returns `false` if the queue is full.
    pub fn submit_command(&self, cmd: AppCommand) -> bool {
        match self.commands.try_send(cmd) {
            Ok(()) => true,
            Err(_) => {
                warn!("Cloud: command queue full, command dropped");
                false
            }
        }
    }

    /// Next queued inbound command, if any.
    pub fn next_command(&self) -> Option<AppCommand> {
        self.commands.try_receive().ok()
    }

    /// Next message for the network task, if any.
    pub fn next_outbound(&self) -> Option<OutboundMsg> {
        self.outbound.try_receive().ok()
    }

    fn send(&self, msg: OutboundMsg) -> Result<(), RemoteError> {
        self.outbound
            .try_send(msg)
            .map_err(|_| RemoteError::QueueFull)
    }
}

impl CloudPort for CloudBridge<'_> {
    fn send_power_state(&mut self, device: &DeviceId, on: bool) -> Result<(), RemoteError> {
        self.send(OutboundMsg::PowerState {
            device: device.clone(),
            on,
        })
    }
}

impl NotifierPort for CloudBridge<'_> {
    fn announce(&mut self, message: &str) -> Result<(), RemoteError> {
        let mut text = String::new();
        for c in message.chars() {
            if text.push(c).is_err() {
                break;
            }
        }
        self.send(OutboundMsg::Announce(text))
    }
}
