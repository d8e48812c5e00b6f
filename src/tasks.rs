//! Periodic sense → publish loops.
//!
//! Each source runs its own [`SensorTask`] on its own thread.  A task
//! sleeps its period *after* the publish returns, so a slow publish
//! makes the next sample late rather than skipping it.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, EventSink, PublishPort};
use crate::net::publisher::PublishOutcome;
use crate::sensors::Sampler;
use crate::telemetry::TelemetryPipeline;

pub struct SensorTask<S, P, C, E> {
    sampler: S,
    pipeline: TelemetryPipeline<P>,
    clock: C,
    sink: E,
    period: Duration,
    read_retry: Duration,
}

/// What one iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Sampled; `None` when the pipeline skipped the reading.
    Sampled(Option<PublishOutcome>),
    /// The sensor read failed.
    ReadFailed,
}

impl<S, P, C, E> SensorTask<S, P, C, E>
where
    S: Sampler,
    P: PublishPort,
    C: Clock,
    E: EventSink,
{
    pub fn new(sampler: S, pipeline: TelemetryPipeline<P>, clock: C, sink: E, period: Duration) -> Self {
        Self {
            sampler,
            pipeline,
            clock,
            sink,
            period,
            read_retry: period,
        }
    }

    /// Delay used after a failed read instead of the full period.
    pub fn with_read_retry(mut self, retry: Duration) -> Self {
        self.read_retry = retry;
        self
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Sample once and publish.  Returns what happened and how long to
    /// wait before the next step.
    pub fn step(&mut self) -> (StepResult, Duration) {
        let now = self.clock.now();
        match self.sampler.sample(now, &mut self.sink) {
            Ok(reading) => {
                self.sink.emit(&AppEvent::Sampled(reading));
                let outcome = self.pipeline.handle(&reading, &mut self.sink);
                (StepResult::Sampled(outcome), self.period)
            }
            Err(error) => {
                self.sink.emit(&AppEvent::ReadFailed {
                    source: self.sampler.source(),
                    error,
                });
                (StepResult::ReadFailed, self.read_retry)
            }
        }
    }

    /// Loop until `stop` is set.  Checked once per iteration.
    pub fn run(mut self, stop: &AtomicBool) {
        info!("{} task started (period {} ms)", self.sampler.source(), self.period.as_millis());
        while !stop.load(Ordering::Relaxed) {
            let (_, wait) = self.step();
            self.clock.sleep(wait);
        }
        info!("{} task stopped", self.sampler.source());
    }
}
