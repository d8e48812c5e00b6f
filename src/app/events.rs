//! Outbound application events.
//!
//! Sensor tasks and the WiFi session emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::{FormatError, SensorError};
use crate::net::publisher::PublishOutcome;
use crate::net::wifi::SessionState;
use crate::sensors::{Reading, Source};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A sampler produced a reading.
    Sampled(Reading),

    /// A sample could not be taken; sampling resumes next period.
    ReadFailed { source: Source, error: SensorError },

    /// The smoke alert output changed level.
    AlertChanged { active: bool, raw: u16 },

    /// One publish attempt finished.
    Published { source: Source, outcome: PublishOutcome },

    /// A reading was not published (policy or formatting).
    PublishSkipped { source: Source, reason: SkipReason },

    /// The WiFi session state machine moved.
    SessionChanged { from: SessionState, to: SessionState },
}

/// Why a reading never reached the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Flame policy publishes on detection only.
    NoDetection,
    /// The request did not fit its buffer.
    Format(FormatError),
}
