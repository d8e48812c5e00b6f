//! One-shot peripheral initialization.
//!
//! Configures the smoke ADC channel and the flame/alert GPIOs with raw
//! ESP-IDF sys calls.  Each peripheral is checked on its own so a dead
//! sensor only disables the task that owns it.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::Error;
#[cfg(target_os = "espidf")]
use crate::error::{Device, SensorError};
#[cfg(target_os = "espidf")]
use crate::pins;

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: ADC1_HANDLE is written once in `init_smoke_adc()` before any
/// sampler thread is spawned, and only read afterwards.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
pub fn init_smoke_adc() -> Result<(), Error> {
    let not_ready = |rc: i32| {
        log::error!("hw_init: ADC1 init failed (rc={})", rc);
        Error::DeviceNotReady(Device::SmokeAdc)
    };

    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: single-threaded boot path; ADC1_HANDLE is only written here.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(not_ready(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    // SAFETY: handle initialised above.
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::SMOKE_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(not_ready(ret));
    }

    info!("hw_init: ADC1 CH{} configured (smoke)", pins::SMOKE_ADC_CHANNEL);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_smoke_adc() -> Result<(), Error> {
    log::info!("hw_init(sim): smoke ADC simulated");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract; oneshot reads are serialised by
    // the single smoke task.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::AdcReadFailed);
    }
    u16::try_from(raw).map_err(|_| SensorError::OutOfRange)
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn configure_gpio(pin: i32, mode: gpio_mode_t, device: Device) -> Result<(), Error> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: boot path, pin owned by this firmware.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        log::error!("hw_init: GPIO{} config failed (rc={})", pin, ret);
        return Err(Error::DeviceNotReady(device));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn init_flame_input() -> Result<(), Error> {
    configure_gpio(pins::FLAME_GPIO, gpio_mode_t_GPIO_MODE_INPUT, Device::FlameInput)?;
    info!("hw_init: flame input on GPIO{}", pins::FLAME_GPIO);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn init_alert_output() -> Result<(), Error> {
    configure_gpio(pins::ALERT_LED_GPIO, gpio_mode_t_GPIO_MODE_OUTPUT, Device::AlertOutput)?;
    gpio_write(pins::ALERT_LED_GPIO, false);
    info!("hw_init: alert LED on GPIO{}", pins::ALERT_LED_GPIO);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_flame_input() -> Result<(), Error> {
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_alert_output() -> Result<(), Error> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on a configured input.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: configured output pin; single writer (smoke task).
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}
