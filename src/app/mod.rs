//! Application core: pure domain logic, zero I/O.
//!
//! This module wires the reconciliation engine together: switch debounce,
//! relay synchronisation, alarm reconciliation, the emergency window and
//! the display lease.  All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
