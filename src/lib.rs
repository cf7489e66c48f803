//! CareLink bedside hub firmware library.
//!
//! Exposes the pure-logic engine (debounce, relay sync, alarm
//! reconciliation, emergency window, display lease) and its adapters for
//! integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alarms;
pub mod app;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod display_gate;
pub mod emergency;
pub mod error;
pub mod relay;

pub mod adapters;
pub mod drivers;
pub mod sensors;
