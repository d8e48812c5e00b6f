//! Log-based event sink adapter.
//!
//! Renders every [`AppEvent`] as one tagged log line.  This is the only
//! place that decides how domain events look on the console.

use log::{info, warn};

use crate::app::events::{AppEvent, SkipReason};
use crate::app::ports::EventSink;
use crate::net::publisher::PublishOutcome;
use crate::sensors::ReadingValue;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Sampled(r) => match r.value() {
                ReadingValue::Raw(raw) => {
                    info!("READ | {} raw={} t={}ms", r.source(), raw, r.sampled_at().as_millis());
                }
                ReadingValue::Detected(d) => {
                    info!("READ | {} detected={} t={}ms", r.source(), d, r.sampled_at().as_millis());
                }
            },
            AppEvent::ReadFailed { source, error } => {
                warn!("READ | {} failed: {}", source, error);
            }
            AppEvent::AlertChanged { active, raw } => {
                info!("ALERT | smoke {} (raw={})", if *active { "ON" } else { "off" }, raw);
            }
            AppEvent::Published { source, outcome } => match outcome {
                PublishOutcome::Sent => info!("PUBLISH | {} sent", source),
                other => warn!("PUBLISH | {} failed: {:?}", source, other),
            },
            AppEvent::PublishSkipped { source, reason } => match reason {
                SkipReason::NoDetection => info!("PUBLISH | {} skipped (no detection)", source),
                SkipReason::Format(e) => warn!("PUBLISH | {} skipped: {}", source, e),
            },
            AppEvent::SessionChanged { from, to } => {
                info!("WIFI | {:?} -> {:?}", from, to);
            }
        }
    }
}
