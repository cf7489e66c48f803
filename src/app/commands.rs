//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the cloud
//! device-control channel, a caregiver dashboard) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::DeviceId;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Remote power command from the cloud channel.
    Power { device: DeviceId, on: bool },

    /// Drop an alarm without announcing it.  The index is consumed and
    /// never fetched again.
    DismissAlarm(u32),
}
