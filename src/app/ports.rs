//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ domain (at · net · sensors · telemetry)
//! ```
//!
//! The flame input and the alert output use the `embedded-hal` digital
//! traits directly; everything the HAL does not cover is declared here.

use core::fmt;
use core::time::Duration;

use crate::config::{Endpoint, SystemConfig};
use crate::error::SensorError;
use crate::net::publisher::PublishOutcome;

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: domain ↔ radio UART)
// ───────────────────────────────────────────────────────────────

/// Byte-level link to the radio module.
pub trait SerialPort: Send {
    /// Push `bytes` out.  Blocks until the link has accepted them.
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError>;

    /// Return one received byte, or `Ok(None)` if nothing is pending.
    /// Never blocks.
    fn read_byte(&mut self) -> Result<Option<u8>, SerialError>;
}

/// Low-level serial failures.  The AT layer logs these and otherwise
/// treats them like silence, so they surface as protocol timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    /// Driver returned an error code.
    Io(i32),
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(rc) => write!(f, "serial I/O error (rc={})", rc),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Analog input (driven adapter: ADC → domain)
// ───────────────────────────────────────────────────────────────

/// One configured ADC channel.
pub trait AnalogInput: Send {
    /// Take one raw sample.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Monotonic clock
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.  Every wait in the firmware goes through this
/// trait, so tests can advance time instead of sleeping.
pub trait Clock: Send + Sync {
    /// Time since boot.
    fn now(&self) -> Duration;

    /// Yield the calling task for `d`.
    fn sleep(&self, d: Duration);
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }
}

// ───────────────────────────────────────────────────────────────
// Publish port (domain → HTTP-over-AT)
// ───────────────────────────────────────────────────────────────

/// One best-effort HTTP publish attempt to `endpoint`, whose tokens
/// decide what counts as progress.
///
/// Implemented by [`HttpOverAtPublisher`](crate::net::publisher::HttpOverAtPublisher);
/// tests substitute a recorder.
pub trait PublishPort {
    fn publish(&self, endpoint: &Endpoint, request: &[u8]) -> PublishOutcome;
}

impl<P: PublishPort + ?Sized> PublishPort for std::sync::Arc<P> {
    fn publish(&self, endpoint: &Endpoint, request: &[u8]) -> PublishOutcome {
        (**self).publish(endpoint, request)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations MUST run [`SystemConfig::validate`] before returning.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
