//! GPIO / peripheral pin assignments for the FireNode board (ESP32-S3).
//!
//! Single source of truth: drivers and adapters reference these rather
//! than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// ESP-01 radio (UART1)
// ---------------------------------------------------------------------------

/// MCU TX → ESP-01 RX.
pub const RADIO_TX_GPIO: i32 = 17;
/// MCU RX ← ESP-01 TX.
pub const RADIO_RX_GPIO: i32 = 18;
/// Factory default of the ESP-01 AT firmware.
pub const RADIO_BAUD: u32 = 115_200;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// MQ-2 smoke sensor analog output.  ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const SMOKE_ADC_GPIO: i32 = 5;
pub const SMOKE_ADC_CHANNEL: u32 = 4;

/// Flame sensor digital output.  HIGH = flame detected.
pub const FLAME_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Smoke alert LED (active HIGH).
pub const ALERT_LED_GPIO: i32 = 7;
