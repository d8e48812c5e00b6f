//! Networking through the radio's AT dialect.
//!
//! - [`wifi`]: reset, station mode and join, once at boot.
//! - [`http`]: pure request formatting.
//! - [`publisher`]: one HTTP request per locked connect/send/close sequence.

pub mod http;
pub mod publisher;
pub mod wifi;

pub use http::{build_request, Request};
pub use publisher::{HttpOverAtPublisher, OfflinePublisher, PublishOutcome};
pub use wifi::{SessionState, WifiSession};
