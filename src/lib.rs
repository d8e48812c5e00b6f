//! FireNode firmware library.
//!
//! Smoke and flame sampling with HTTP publishing through an ESP-01 radio
//! driven over AT commands.  All pure logic lives here and is testable on
//! the host; ESP-IDF specifics are guarded by `#[cfg(target_os = "espidf")]`
//! inside the adapter and driver modules.

#![deny(unused_must_use)]

pub mod app;
pub mod at;
pub mod config;
pub mod error;
pub mod net;
pub mod pins;
pub mod sensors;
pub mod tasks;
pub mod telemetry;

pub mod adapters;
pub mod drivers;
