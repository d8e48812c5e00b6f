//! ESP-IDF UART link to the ESP-01 radio.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::uart::{config::Config, Uart, UartDriver};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::sys::EspError;
use log::info;

use crate::app::ports::{SerialError, SerialPort};
use crate::pins;

pub struct UartLink {
    uart: UartDriver<'static>,
}

impl UartLink {
    /// Install the driver on the radio pins at [`pins::RADIO_BAUD`].
    pub fn new<U: Uart>(uart: impl Peripheral<P = U> + 'static) -> Result<Self, EspError> {
        let config = Config::default().baudrate(Hertz(pins::RADIO_BAUD));
        // SAFETY: the radio pins are claimed by nothing else in the firmware.
        let (tx, rx) = unsafe {
            (
                AnyIOPin::new(pins::RADIO_TX_GPIO),
                AnyIOPin::new(pins::RADIO_RX_GPIO),
            )
        };
        let uart = UartDriver::new(
            uart,
            tx,
            rx,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;
        info!(
            "UART: radio link on TX={} RX={} @ {} baud",
            pins::RADIO_TX_GPIO,
            pins::RADIO_RX_GPIO,
            pins::RADIO_BAUD
        );
        Ok(Self { uart })
    }
}

impl SerialPort for UartLink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let n = self.uart.write(rest).map_err(|e| SerialError::Io(e.code()))?;
            rest = &rest[n..];
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SerialError> {
        let mut buf = [0u8; 1];
        match self.uart.read(&mut buf, NON_BLOCK) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(SerialError::Io(e.code())),
        }
    }
}
