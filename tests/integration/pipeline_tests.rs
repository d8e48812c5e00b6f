//! Sampler → pipeline → publisher, end to end.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use firenode::app::events::{AppEvent, SkipReason};
use firenode::app::ports::{AnalogInput, PublishPort};
use firenode::config::{FlamePublishPolicy, SystemConfig};
use firenode::error::SensorError;
use firenode::net::{HttpOverAtPublisher, OfflinePublisher, PublishOutcome, SessionState, WifiSession};
use firenode::sensors::{FlameSampler, SmokeSampler};
use firenode::tasks::{SensorTask, StepResult};
use firenode::telemetry::TelemetryPipeline;

use crate::mock_hw::{config, healthy_radio, transport, ManualClock, RecordingPublisher, RecordingSink};

// ── Test peripherals ──────────────────────────────────────────

/// ADC whose level the test can change; `u16::MAX` means "read fails".
#[derive(Clone, Default)]
struct Adc(Arc<AtomicU16>);

impl AnalogInput for Adc {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        match self.0.load(Ordering::SeqCst) {
            u16::MAX => Err(SensorError::AdcReadFailed),
            v => Ok(v),
        }
    }
}

#[derive(Clone, Default)]
struct Pin(Arc<AtomicBool>);

impl ErrorType for Pin {
    type Error = Infallible;
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.load(Ordering::SeqCst))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.load(Ordering::SeqCst))
    }
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn period(cfg: &SystemConfig) -> Duration {
    Duration::from_millis(u64::from(cfg.smoke.period_ms))
}

// ── Smoke ─────────────────────────────────────────────────────

#[test]
fn smoke_above_threshold_alerts_and_publishes_raw_value() {
    let cfg = config();
    let adc = Adc::default();
    adc.0.store(1600, Ordering::SeqCst);
    let led = Pin::default();
    let publisher = Arc::new(RecordingPublisher::new());
    let pipeline = TelemetryPipeline::new(Arc::clone(&publisher), &cfg.smoke, &cfg.flame);
    let mut task = SensorTask::new(
        SmokeSampler::new(adc, led.clone(), 1500),
        pipeline,
        Arc::new(ManualClock::new()),
        RecordingSink::new(),
        period(&cfg),
    );

    let (result, wait) = task.step();
    assert_eq!(result, StepResult::Sampled(Some(PublishOutcome::Sent)));
    assert_eq!(wait, period(&cfg));
    assert!(led.0.load(Ordering::SeqCst), "alert must be asserted");

    let calls = publisher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].host, "api.thingspeak.com");
    assert_eq!(calls[0].port, 80);
    assert!(calls[0].request.contains("&value=1600"));
    assert!(
        task.sink()
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::AlertChanged { active: true, raw: 1600 }))
    );
}

#[test]
fn smoke_below_threshold_still_publishes() {
    let cfg = config();
    let adc = Adc::default();
    adc.0.store(300, Ordering::SeqCst);
    let led = Pin(Arc::new(AtomicBool::new(true)));
    let publisher = Arc::new(RecordingPublisher::new());
    let mut task = SensorTask::new(
        SmokeSampler::new(adc, led.clone(), 1500),
        TelemetryPipeline::new(Arc::clone(&publisher), &cfg.smoke, &cfg.flame),
        Arc::new(ManualClock::new()),
        RecordingSink::new(),
        period(&cfg),
    );

    task.step();
    assert!(!led.0.load(Ordering::SeqCst));
    assert!(publisher.calls()[0].request.contains("&value=300"));
}

#[test]
fn smoke_read_failure_retries_sooner_without_publishing() {
    let cfg = config();
    let adc = Adc::default();
    adc.0.store(u16::MAX, Ordering::SeqCst);
    let publisher = Arc::new(RecordingPublisher::new());
    let retry = Duration::from_millis(u64::from(cfg.smoke.read_retry_ms));
    let mut task = SensorTask::new(
        SmokeSampler::new(adc.clone(), Pin::default(), 1500),
        TelemetryPipeline::new(Arc::clone(&publisher), &cfg.smoke, &cfg.flame),
        Arc::new(ManualClock::new()),
        RecordingSink::new(),
        period(&cfg),
    )
    .with_read_retry(retry);

    assert_eq!(task.step(), (StepResult::ReadFailed, retry));
    assert!(publisher.calls().is_empty());

    adc.0.store(800, Ordering::SeqCst);
    assert_eq!(task.step().0, StepResult::Sampled(Some(PublishOutcome::Sent)));
}

// ── Flame ─────────────────────────────────────────────────────

fn flame_task(
    policy: FlamePublishPolicy,
    pin: &Pin,
    publisher: &Arc<RecordingPublisher>,
) -> SensorTask<FlameSampler<Pin>, Arc<RecordingPublisher>, Arc<ManualClock>, RecordingSink> {
    let mut cfg = config();
    cfg.flame.policy = policy;
    SensorTask::new(
        FlameSampler::new(pin.clone()),
        TelemetryPipeline::new(Arc::clone(publisher), &cfg.smoke, &cfg.flame),
        Arc::new(ManualClock::new()),
        RecordingSink::new(),
        Duration::from_millis(u64::from(cfg.flame.period_ms)),
    )
}

#[test]
fn flame_detected_publishes_one() {
    let pin = Pin(Arc::new(AtomicBool::new(true)));
    let publisher = Arc::new(RecordingPublisher::new());
    let mut task = flame_task(FlamePublishPolicy::Always, &pin, &publisher);

    task.step();
    assert!(publisher.calls()[0].request.contains("&status=1"));
}

#[test]
fn flame_clear_publishes_zero_by_default() {
    let pin = Pin::default();
    let publisher = Arc::new(RecordingPublisher::new());
    let mut task = flame_task(SystemConfig::default().flame.policy, &pin, &publisher);

    task.step();
    assert!(publisher.calls()[0].request.contains("&status=0"));
}

#[test]
fn flame_clear_is_skipped_on_detection_policy() {
    let pin = Pin::default();
    let publisher = Arc::new(RecordingPublisher::new());
    let mut task = flame_task(FlamePublishPolicy::OnDetection, &pin, &publisher);

    assert_eq!(task.step().0, StepResult::Sampled(None));
    assert!(publisher.calls().is_empty());
    assert!(task.sink().events.iter().any(|e| matches!(
        e,
        AppEvent::PublishSkipped {
            reason: SkipReason::NoDetection,
            ..
        }
    )));

    pin.0.store(true, Ordering::SeqCst);
    task.step();
    assert_eq!(publisher.calls().len(), 1);
}

// ── Best-effort policy ────────────────────────────────────────

#[test]
fn failed_join_does_not_stop_publishing() {
    let port = healthy_radio();
    port.on("AT+CWJAP", b"+CWJAP:1\r\n\r\nFAIL\r\n");
    let (t, _clock) = transport(&port);
    let cfg = config();

    let mut wifi = WifiSession::new(cfg.wifi.clone());
    assert!(!wifi.connect(&t, &mut RecordingSink::new()));
    assert_eq!(wifi.state(), SessionState::Failed);

    let publisher = Arc::new(HttpOverAtPublisher::new(Arc::clone(&t), cfg.publish.clone()));
    let pin = Pin(Arc::new(AtomicBool::new(true)));
    let mut task = SensorTask::new(
        FlameSampler::new(pin),
        TelemetryPipeline::new(publisher, &cfg.smoke, &cfg.flame),
        Arc::new(ManualClock::new()),
        RecordingSink::new(),
        Duration::from_secs(5),
    );

    assert_eq!(task.step().0, StepResult::Sampled(Some(PublishOutcome::Sent)));
    assert_eq!(port.count("AT+CIPSTART"), 1);
    assert_eq!(port.count("GET /update?api_key=YOUR_API_KEY&status=1"), 1);
}

#[test]
fn missing_radio_keeps_sampling_and_alerting() {
    let cfg = config();
    let adc = Adc::default();
    adc.0.store(1600, Ordering::SeqCst);
    let led = Pin::default();
    let publisher: Arc<dyn PublishPort + Send + Sync> = Arc::new(OfflinePublisher);
    let mut task = SensorTask::new(
        SmokeSampler::new(adc.clone(), led.clone(), cfg.smoke.threshold),
        TelemetryPipeline::new(publisher, &cfg.smoke, &cfg.flame),
        Arc::new(ManualClock::new()),
        RecordingSink::new(),
        period(&cfg),
    );

    assert_eq!(
        task.step(),
        (StepResult::Sampled(Some(PublishOutcome::TransportTimeout)), period(&cfg))
    );
    assert!(led.0.load(Ordering::SeqCst));

    adc.0.store(200, Ordering::SeqCst);
    assert_eq!(task.step().0, StepResult::Sampled(Some(PublishOutcome::TransportTimeout)));
    assert!(!led.0.load(Ordering::SeqCst));
}
