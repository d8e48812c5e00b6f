//! FireNode firmware entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │  UartLink / SimModem   SmokeAdc · FlameInput · AlertLed       │
//! │  (SerialPort)          (AnalogInput · InputPin · OutputPin)   │
//! │  SystemClock (Clock)   LogEventSink (EventSink)  ConfigStore  │
//! │                                                               │
//! │  ─────────────────── Port trait boundary ───────────────────  │
//! │                                                               │
//! │   AtTransport ◀── WifiSession (boot, once)                    │
//! │        ▲                                                      │
//! │        └────── HttpOverAtPublisher ◀── TelemetryPipeline      │
//! │                                             ▲        ▲        │
//! │                                      smoke task  flame task   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot order: logger → config → radio link → drain + probe → WiFi join
//! → sampler tasks.  A failed probe or join is logged and boot goes on;
//! publishing is attempted regardless of WiFi state.  Without a radio
//! link the samplers still run and every publish reports a timeout.

use core::sync::atomic::AtomicBool;
use core::time::Duration;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{anyhow, Result};
use log::{error, info, warn};

use firenode::adapters::config_store::ConfigStore;
use firenode::adapters::hardware::{AlertLed, FlameInput, SmokeAdc};
use firenode::adapters::log_sink::LogEventSink;
use firenode::adapters::time::SystemClock;
use firenode::app::ports::{ConfigPort, PublishPort, SerialPort};
use firenode::at::AtTransport;
use firenode::config::{ms, SystemConfig};
use firenode::drivers::hw_init;
use firenode::drivers::task_pin::{spawn_on_core, TaskSpec, FLAME_TASK, SMOKE_TASK};
use firenode::error::{Device, Error};
use firenode::net::{HttpOverAtPublisher, OfflinePublisher, WifiSession};
use firenode::pins;
use firenode::sensors::{FlameSampler, SmokeSampler};
use firenode::tasks::SensorTask;
use firenode::telemetry::TelemetryPipeline;

/// Never set on the device; the sampler loops run for the life of the node.
static STOP: AtomicBool = AtomicBool::new(false);

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

#[cfg(target_os = "espidf")]
fn open_radio() -> Result<firenode::adapters::uart::UartLink> {
    use esp_idf_hal::peripherals::Peripherals;

    let peripherals = Peripherals::take()?;
    Ok(firenode::adapters::uart::UartLink::new(peripherals.uart1)?)
}

/// Host: an emulated ESP-01.  `FIRENODE_SIM_FAULTS` takes a comma list
/// of `join`, `connect`, `prompt`.
#[cfg(not(target_os = "espidf"))]
fn open_radio() -> Result<firenode::adapters::sim_modem::SimModem> {
    use core::sync::atomic::Ordering;
    use firenode::adapters::sim_modem::SimModem;

    let (modem, control) = SimModem::new();
    if let Ok(faults) = std::env::var("FIRENODE_SIM_FAULTS") {
        for fault in faults.split(',').map(str::trim) {
            match fault {
                "join" => control.join_fails.store(true, Ordering::Relaxed),
                "connect" => control.connect_silent.store(true, Ordering::Relaxed),
                "prompt" => control.no_prompt.store(true, Ordering::Relaxed),
                "" => {}
                other => warn!("sim: unknown fault '{}'", other),
            }
        }
    }
    info!("Radio: simulated ESP-01");
    Ok(modem)
}

fn load_config() -> SystemConfig {
    match ConfigStore::from_env().load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("{}, using defaults", Error::from(e));
            SystemConfig::default()
        }
    }
}

/// Boot drain, readiness probe and WiFi join.  Every failure here is
/// logged and boot goes on.
fn bring_up_radio<S: SerialPort>(transport: &AtTransport<S, Arc<SystemClock>>, config: &SystemConfig) {
    let boot_bytes = transport.session().drain(ms(config.at.drain_ms));
    info!("Radio: discarded {} bytes of boot output", boot_bytes);
    if transport.probe() {
        info!("Radio: AT probe OK");
    } else {
        warn!("Radio: no reply to AT probe, continuing");
    }

    let mut wifi = WifiSession::new(config.wifi.clone());
    if !wifi.connect(transport, &mut LogEventSink::new()) {
        warn!("WiFi: join failed, sensors will publish anyway");
    }
}

fn spawn_sampler(handles: &mut Vec<JoinHandle<()>>, slot: TaskSpec, body: impl FnOnce() + Send + 'static) {
    match spawn_on_core(slot, body) {
        Ok(h) => handles.push(h),
        Err(e) => error!("{} task not started: {}", slot.name.trim_end_matches('\0'), e),
    }
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    init_logging()?;
    info!("FireNode v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    let clock = Arc::new(SystemClock::new());

    // ── 3. Radio link, probe, WiFi join (best effort) ─────────
    let publisher: Arc<dyn PublishPort + Send + Sync> = match open_radio() {
        Ok(link) => {
            let transport = Arc::new(AtTransport::new(link, Arc::clone(&clock), config.at));
            bring_up_radio(&transport, &config);
            Arc::new(HttpOverAtPublisher::new(transport, config.publish.clone()))
        }
        Err(e) => {
            error!("{} ({}); sensors run without publishing", Error::DeviceNotReady(Device::Serial), e);
            Arc::new(OfflinePublisher)
        }
    };

    // ── 4. Publishing pipeline ────────────────────────────────
    let pipeline = TelemetryPipeline::new(publisher, &config.smoke, &config.flame);

    // ── 5. Sampler tasks ──────────────────────────────────────
    let mut handles = Vec::new();

    match hw_init::init_smoke_adc().and_then(|()| hw_init::init_alert_output()) {
        Ok(()) => {
            let sampler = SmokeSampler::new(
                SmokeAdc::new(pins::SMOKE_ADC_CHANNEL),
                AlertLed::new(pins::ALERT_LED_GPIO),
                config.smoke.threshold,
            );
            let task = SensorTask::new(
                sampler,
                pipeline.clone(),
                Arc::clone(&clock),
                LogEventSink::new(),
                ms(config.smoke.period_ms),
            )
            .with_read_retry(ms(config.smoke.read_retry_ms));
            spawn_sampler(&mut handles, SMOKE_TASK, move || task.run(&STOP));
        }
        Err(e) => error!("{}; smoke task not started", e),
    }

    match hw_init::init_flame_input() {
        Ok(()) => {
            let task = SensorTask::new(
                FlameSampler::new(FlameInput::new(pins::FLAME_GPIO)),
                pipeline,
                Arc::clone(&clock),
                LogEventSink::new(),
                ms(config.flame.period_ms),
            );
            spawn_sampler(&mut handles, FLAME_TASK, move || task.run(&STOP));
        }
        Err(e) => error!("{}; flame task not started", e),
    }

    #[cfg(not(target_os = "espidf"))]
    simulate_environment(&clock);

    for h in handles {
        h.join().map_err(|_| anyhow!("sampler task panicked"))?;
    }
    Ok(())
}

/// Host only: slowly ramp the simulated smoke level through the
/// threshold and toggle the flame input, forever.
#[cfg(not(target_os = "espidf"))]
fn simulate_environment(clock: &SystemClock) {
    use firenode::adapters::hardware::{sim_set_flame, sim_set_smoke_raw};
    use firenode::app::ports::Clock;

    let mut raw: u16 = 1200;
    let mut rising = true;
    let mut tick: u32 = 0;
    loop {
        sim_set_smoke_raw(raw);
        sim_set_flame(tick % 4 == 3);
        if rising {
            raw += 100;
            rising = raw < 1900;
        } else {
            raw -= 100;
            rising = raw <= 1200;
        }
        tick = tick.wrapping_add(1);
        clock.sleep(Duration::from_secs(3));
    }
}
