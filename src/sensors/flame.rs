//! Digital flame sensor.

use core::time::Duration;

use embedded_hal::digital::InputPin;

use super::{Reading, Sampler, Source};
use crate::app::ports::EventSink;
use crate::error::SensorError;

/// Reads one GPIO; logical high means flame detected.
pub struct FlameSampler<P> {
    pin: P,
}

impl<P: InputPin> FlameSampler<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin + Send> Sampler for FlameSampler<P> {
    fn source(&self) -> Source {
        Source::Flame
    }

    fn sample(&mut self, now: Duration, _sink: &mut dyn EventSink) -> Result<Reading, SensorError> {
        let detected = self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)?;
        Ok(Reading::flame(detected, now))
    }
}
