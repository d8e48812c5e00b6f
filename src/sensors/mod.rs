//! Sensor sampling: one sampler per source, each producing an immutable
//! [`Reading`] per period.
//!
//! Samplers only read and (for smoke) drive the alert output.  Turning a
//! reading into a published value is the pipeline's job.

pub mod flame;
pub mod smoke;

use core::fmt;
use core::time::Duration;

use crate::app::ports::EventSink;
use crate::error::SensorError;

pub use flame::FlameSampler;
pub use smoke::SmokeSampler;

/// Full scale of the 12-bit smoke ADC.
pub const ADC_MAX: u16 = 4095;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Smoke,
    Flame,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smoke => write!(f, "smoke"),
            Self::Flame => write!(f, "flame"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingValue {
    /// Raw ADC units, `0..=ADC_MAX`.
    Raw(u16),
    /// Digital flame state.
    Detected(bool),
}

/// One timestamped sample.  Fields are private; a reading cannot change
/// after the sampler hands it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    source: Source,
    value: ReadingValue,
    sampled_at: Duration,
}

impl Reading {
    /// Smoke reading.  Rejects values outside the 12-bit range.
    pub fn smoke(raw: u16, sampled_at: Duration) -> Result<Self, SensorError> {
        if raw > ADC_MAX {
            return Err(SensorError::OutOfRange);
        }
        Ok(Self {
            source: Source::Smoke,
            value: ReadingValue::Raw(raw),
            sampled_at,
        })
    }

    pub fn flame(detected: bool, sampled_at: Duration) -> Self {
        Self {
            source: Source::Flame,
            value: ReadingValue::Detected(detected),
            sampled_at,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn value(&self) -> ReadingValue {
        self.value
    }

    /// Monotonic time of the sample.
    pub fn sampled_at(&self) -> Duration {
        self.sampled_at
    }
}

/// A periodic sensor source.
pub trait Sampler: Send {
    fn source(&self) -> Source;

    /// Take one sample at monotonic time `now`.  Side effects (alert
    /// output changes) are reported through `sink`.
    fn sample(&mut self, now: Duration, sink: &mut dyn EventSink) -> Result<Reading, SensorError>;
}
