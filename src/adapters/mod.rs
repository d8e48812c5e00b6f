//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter        | Implements                 | Connects to              |
//! |----------------|----------------------------|--------------------------|
//! | `config_store` | ConfigPort                 | JSON file / defaults     |
//! | `hardware`     | AnalogInput, InputPin,     | ESP32 ADC1, GPIO         |
//! |                | OutputPin                  |                          |
//! | `log_sink`     | EventSink                  | Serial log output        |
//! | `sim_modem`    | SerialPort (host)          | Emulated ESP-01          |
//! | `time`         | Clock                      | esp_timer / Instant      |
//! | `uart`         | SerialPort (device)        | UART1 → ESP-01           |

pub mod config_store;
pub mod hardware;
pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod sim_modem;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
