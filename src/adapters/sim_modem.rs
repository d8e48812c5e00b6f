//! Host-side ESP-01 emulator.
//!
//! Implements [`SerialPort`] by parsing the command lines written to it
//! and queueing the replies a stock AT firmware would print.  Faults are
//! toggled through a shared [`SimModemControl`] while the modem is owned
//! by the transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use heapless::HistoryBuffer;
use log::trace;

use crate::app::ports::{SerialError, SerialPort};

/// Command lines kept for inspection; older ones are overwritten.
pub const COMMAND_HISTORY: usize = 32;

/// Fault knobs and counters shared with the running modem.
pub struct SimModemControl {
    /// `AT+CWJAP` answers `FAIL` instead of `WIFI CONNECTED`.
    pub join_fails: AtomicBool,
    /// `AT+CIPSTART` gets no reply at all.
    pub connect_silent: AtomicBool,
    /// `AT+CIPSEND` answers `ERROR` instead of the `>` prompt.
    pub no_prompt: AtomicBool,
    /// Completed HTTP payloads.
    pub requests_sent: AtomicU32,
    log: Mutex<HistoryBuffer<String, COMMAND_HISTORY>>,
}

impl Default for SimModemControl {
    fn default() -> Self {
        Self {
            join_fails: AtomicBool::new(false),
            connect_silent: AtomicBool::new(false),
            no_prompt: AtomicBool::new(false),
            requests_sent: AtomicU32::new(0),
            log: Mutex::new(HistoryBuffer::new()),
        }
    }
}

impl SimModemControl {
    /// The most recent command lines, oldest first.
    pub fn commands(&self) -> Vec<String> {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.oldest_ordered().cloned().collect()
    }

    fn record(&self, line: &str) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(line.to_owned());
    }
}

enum Mode {
    Command,
    /// Passthrough after `>`: this many payload bytes still expected.
    Data { remaining: usize, total: usize },
}

pub struct SimModem {
    control: Arc<SimModemControl>,
    rx: VecDeque<u8>,
    line: Vec<u8>,
    mode: Mode,
    connected: bool,
}

impl SimModem {
    /// A freshly powered module: the boot banner is already pending.
    pub fn new() -> (Self, Arc<SimModemControl>) {
        let control = Arc::new(SimModemControl::default());
        let mut modem = Self {
            control: Arc::clone(&control),
            rx: VecDeque::new(),
            line: Vec::new(),
            mode: Mode::Command,
            connected: false,
        };
        // Bootloader noise at the wrong baud rate, then the banner.
        modem.reply(b"\xff\x00ets Jan  8 2013\r\n");
        modem.reply(b"ready\r\n");
        (modem, control)
    }

    fn reply(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    fn ok(&mut self) {
        self.reply(b"\r\nOK\r\n");
    }

    fn on_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        trace!("sim-modem: {}", line);
        self.control.record(line);

        let (cmd, arg) = line.split_once('=').unwrap_or((line, ""));
        match cmd {
            "AT" | "AT+CWMODE" | "AT+CIPMUX" => self.ok(),
            "AT+RST" => {
                self.connected = false;
                self.ok();
                self.reply(b"\r\nready\r\n");
            }
            "AT+CWQAP" => {
                self.ok();
                self.reply(b"WIFI DISCONNECT\r\n");
            }
            "AT+CWJAP" => {
                if self.control.join_fails.load(Ordering::Relaxed) {
                    self.reply(b"+CWJAP:3\r\n\r\nFAIL\r\n");
                } else {
                    self.reply(b"WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n");
                }
            }
            "AT+CIFSR" => {
                self.reply(b"+CIFSR:STAIP,\"192.168.4.2\"\r\n+CIFSR:STAMAC,\"5c:cf:7f:00:00:01\"\r\n");
                self.ok();
            }
            "AT+CIPSTART" => {
                if !self.control.connect_silent.load(Ordering::Relaxed) {
                    self.connected = true;
                    self.reply(b"CONNECT\r\n");
                    self.ok();
                }
            }
            "AT+CIPSEND" => match arg.parse::<usize>() {
                Ok(n) if n > 0 && self.connected && !self.control.no_prompt.load(Ordering::Relaxed) => {
                    self.ok();
                    self.reply(b"> ");
                    self.mode = Mode::Data { remaining: n, total: n };
                }
                _ => self.reply(b"\r\nERROR\r\n"),
            },
            "AT+CIPCLOSE" => {
                if self.connected {
                    self.connected = false;
                    self.reply(b"CLOSED\r\n");
                    self.ok();
                } else {
                    self.reply(b"\r\nERROR\r\n");
                }
            }
            _ => self.reply(b"\r\nERROR\r\n"),
        }
    }

    fn on_byte(&mut self, b: u8) {
        match &mut self.mode {
            Mode::Data { remaining, total } => {
                *remaining -= 1;
                if *remaining == 0 {
                    let total = *total;
                    self.mode = Mode::Command;
                    self.control.requests_sent.fetch_add(1, Ordering::Relaxed);
                    self.reply(format!("\r\nRecv {} bytes\r\n\r\nSEND OK\r\n", total).as_bytes());
                    self.reply(b"\r\n+IPD,1:1CLOSED\r\n");
                    self.connected = false;
                }
            }
            Mode::Command => {
                if b == b'\n' {
                    let raw = core::mem::take(&mut self.line);
                    let text = String::from_utf8_lossy(&raw);
                    self.on_line(text.trim_end_matches('\r'));
                } else {
                    self.line.push(b);
                }
            }
        }
    }
}

impl SerialPort for SimModem {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        for &b in bytes {
            self.on_byte(b);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SerialError> {
        Ok(self.rx.pop_front())
    }
}
