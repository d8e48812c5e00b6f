//! Unified error types for the FireNode firmware.
//!
//! Protocol timeouts are deliberately absent: an unanswered AT exchange is
//! reported as a `bool` or a [`PublishOutcome`](crate::net::publisher::PublishOutcome),
//! never as an error.  Everything here is `Copy` so it can be logged and
//! carried in [`AppEvent`](crate::app::events::AppEvent)s without allocation.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A required peripheral failed its readiness check at boot.
    DeviceNotReady(Device),
    /// A single sensor sample could not be obtained.
    Sensor(SensorError),
    /// A command or request did not fit its fixed-capacity buffer.
    Format(FormatError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotReady(d) => write!(f, "device not ready: {d}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Format(e) => write!(f, "format: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Peripherals
// ---------------------------------------------------------------------------

/// Peripherals checked at boot.  A failed check disables the subsystem
/// that owns the peripheral; the rest of the node keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// UART wired to the ESP-01 radio.
    Serial,
    /// ADC channel of the smoke sensor.
    SmokeAdc,
    /// GPIO input of the flame sensor.
    FlameInput,
    /// GPIO output driving the smoke alert LED.
    AlertOutput,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "radio UART"),
            Self::SmokeAdc => write!(f, "smoke ADC"),
            Self::FlameInput => write!(f, "flame GPIO"),
            Self::AlertOutput => write!(f, "alert LED GPIO"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// Sample is outside the 12-bit ADC range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Formatting errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// An AT command line exceeded the command buffer.
    CommandTooLong,
    /// An HTTP request exceeded the request buffer.
    RequestTooLarge,
    /// SSID or password failed validation.
    InvalidCredential,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandTooLong => write!(f, "AT command too long"),
            Self::RequestTooLarge => write!(f, "HTTP request too large"),
            Self::InvalidCredential => write!(f, "invalid WiFi credential"),
        }
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(field) => Self::Config(field),
            ConfigError::Corrupted => Self::Config("stored config is not valid JSON"),
            ConfigError::IoError => Self::Config("config file unreadable"),
        }
    }
}
