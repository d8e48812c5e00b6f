//! Hardware adapter: the smoke ADC, flame input and alert LED behind the
//! [`AnalogInput`] port and the `embedded-hal` digital traits.
//!
//! On non-espidf targets the same types read and write static atomics,
//! so the host binary can inject sensor values with the `sim_*` helpers.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::app::ports::AnalogInput;
use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

    pub(super) static SMOKE_RAW: AtomicU16 = AtomicU16::new(0);
    pub(super) static SMOKE_FAULT: AtomicBool = AtomicBool::new(false);
    pub(super) static FLAME: AtomicBool = AtomicBool::new(false);
    pub(super) static ALERT: AtomicBool = AtomicBool::new(false);

    pub fn set_smoke_raw(raw: u16) {
        SMOKE_RAW.store(raw, Ordering::Relaxed);
    }

    pub fn set_smoke_fault(fault: bool) {
        SMOKE_FAULT.store(fault, Ordering::Relaxed);
    }

    pub fn set_flame(detected: bool) {
        FLAME.store(detected, Ordering::Relaxed);
    }

    pub fn alert_level() -> bool {
        ALERT.load(Ordering::Relaxed)
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::{
    alert_level as sim_alert_level, set_flame as sim_set_flame, set_smoke_fault as sim_set_smoke_fault,
    set_smoke_raw as sim_set_smoke_raw,
};

// ── Smoke ADC ─────────────────────────────────────────────────

pub struct SmokeAdc {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    channel: u32,
}

impl SmokeAdc {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }
}

impl AnalogInput for SmokeAdc {
    #[cfg(target_os = "espidf")]
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        use core::sync::atomic::Ordering;
        if sim::SMOKE_FAULT.load(Ordering::Relaxed) {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(sim::SMOKE_RAW.load(Ordering::Relaxed))
    }
}

// ── Flame input ───────────────────────────────────────────────

pub struct FlameInput {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl FlameInput {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    #[cfg(target_os = "espidf")]
    fn level(&self) -> bool {
        hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn level(&self) -> bool {
        sim::FLAME.load(core::sync::atomic::Ordering::Relaxed)
    }
}

impl ErrorType for FlameInput {
    type Error = Infallible;
}

impl InputPin for FlameInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.level())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.level())
    }
}

// ── Alert LED ─────────────────────────────────────────────────

pub struct AlertLed {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl AlertLed {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    #[cfg(target_os = "espidf")]
    fn drive(&mut self, high: bool) {
        hw_init::gpio_write(self.gpio, high);
    }

    #[cfg(not(target_os = "espidf"))]
    fn drive(&mut self, high: bool) {
        sim::ALERT.store(high, core::sync::atomic::Ordering::Relaxed);
    }
}

impl ErrorType for AlertLed {
    type Error = Infallible;
}

impl OutputPin for AlertLed {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.drive(true);
        Ok(())
    }
}
