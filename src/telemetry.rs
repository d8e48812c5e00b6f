//! Reading → payload → request → publish.
//!
//! Best-effort publish, no backpressure on sensing: the call blocks the
//! sampling task for the whole publish sequence, the outcome is reported
//! as an event, and nothing about it feeds back into sampling.

use core::fmt::Write;

use heapless::String;

use crate::app::events::{AppEvent, SkipReason};
use crate::app::ports::{EventSink, PublishPort};
use crate::config::{Endpoint, FlameConfig, FlamePublishPolicy, SmokeConfig};
use crate::net::http::build_request;
use crate::net::publisher::PublishOutcome;
use crate::sensors::{Reading, ReadingValue, Source};

/// Decimal text of one reading; `"4095"` is the longest.
pub type Payload = String<8>;

/// Smoke values as decimal integers, flame as `"1"` / `"0"`.
pub fn format_payload(value: ReadingValue) -> Payload {
    let mut out = Payload::new();
    // A u16 never exceeds five digits.
    let _ = match value {
        ReadingValue::Raw(raw) => write!(out, "{}", raw),
        ReadingValue::Detected(true) => out.push_str("1").map_err(|_| core::fmt::Error),
        ReadingValue::Detected(false) => out.push_str("0").map_err(|_| core::fmt::Error),
    };
    out
}

#[derive(Clone)]
pub struct TelemetryPipeline<P> {
    publisher: P,
    smoke: Endpoint,
    flame: Endpoint,
    flame_policy: FlamePublishPolicy,
}

impl<P: PublishPort> TelemetryPipeline<P> {
    pub fn new(publisher: P, smoke: &SmokeConfig, flame: &FlameConfig) -> Self {
        Self {
            publisher,
            smoke: smoke.endpoint.clone(),
            flame: flame.endpoint.clone(),
            flame_policy: flame.policy,
        }
    }

    fn endpoint(&self, source: Source) -> &Endpoint {
        match source {
            Source::Smoke => &self.smoke,
            Source::Flame => &self.flame,
        }
    }

    /// Publish one reading.  `None` when the reading was skipped.
    pub fn handle(&self, reading: &Reading, sink: &mut dyn EventSink) -> Option<PublishOutcome> {
        let source = reading.source();

        if self.flame_policy == FlamePublishPolicy::OnDetection
            && reading.value() == ReadingValue::Detected(false)
        {
            sink.emit(&AppEvent::PublishSkipped {
                source,
                reason: SkipReason::NoDetection,
            });
            return None;
        }

        let endpoint = self.endpoint(source);
        let payload = format_payload(reading.value());
        let request = match build_request(endpoint, &payload) {
            Ok(req) => req,
            Err(e) => {
                sink.emit(&AppEvent::PublishSkipped {
                    source,
                    reason: SkipReason::Format(e),
                });
                return None;
            }
        };

        let outcome = self.publisher.publish(endpoint, request.as_bytes());
        sink.emit(&AppEvent::Published { source, outcome });
        Some(outcome)
    }
}
