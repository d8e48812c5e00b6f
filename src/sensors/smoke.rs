//! Analog smoke sensor with a threshold alert output.
//!
//! Every sample drives the alert pin: high while the raw value is above
//! the threshold, low otherwise.  A reading is produced every period
//! whatever the alert state.

use core::time::Duration;

use embedded_hal::digital::OutputPin;
use log::warn;

use super::{Reading, Sampler, Source};
use crate::app::events::AppEvent;
use crate::app::ports::{AnalogInput, EventSink};
use crate::error::SensorError;

pub struct SmokeSampler<A, L> {
    adc: A,
    alert: L,
    threshold: u16,
    /// Last level written to the alert pin, `None` before the first sample.
    alert_active: Option<bool>,
}

impl<A: AnalogInput, L: OutputPin> SmokeSampler<A, L> {
    pub fn new(adc: A, alert: L, threshold: u16) -> Self {
        Self {
            adc,
            alert,
            threshold,
            alert_active: None,
        }
    }

    pub fn alert_active(&self) -> bool {
        self.alert_active.unwrap_or(false)
    }

    fn drive_alert(&mut self, active: bool, raw: u16, sink: &mut dyn EventSink) {
        let res = if active {
            self.alert.set_high()
        } else {
            self.alert.set_low()
        };
        if res.is_err() {
            warn!("SMOKE: alert output write failed");
        }
        if self.alert_active != Some(active) {
            self.alert_active = Some(active);
            sink.emit(&AppEvent::AlertChanged { active, raw });
        }
    }
}

impl<A, L> Sampler for SmokeSampler<A, L>
where
    A: AnalogInput,
    L: OutputPin + Send,
{
    fn source(&self) -> Source {
        Source::Smoke
    }

    fn sample(&mut self, now: Duration, sink: &mut dyn EventSink) -> Result<Reading, SensorError> {
        let raw = self.adc.read_raw()?;
        let reading = Reading::smoke(raw, now)?;
        self.drive_alert(raw > self.threshold, raw, sink);
        Ok(reading)
    }
}
