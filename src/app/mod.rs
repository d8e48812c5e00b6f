//! Application core: port traits and domain events.
//!
//! Everything that touches hardware or time is reached through the
//! **port traits** in [`ports`], so the AT transport, WiFi session,
//! publisher and sensor pipeline are all testable on the host.

pub mod events;
pub mod ports;
