//! Mock hardware for integration tests.
//!
//! - [`ScriptedPort`]: a serial port that answers each command line with
//!   a canned reply and records everything written to it.
//! - [`TimedPort`]: a serial port whose replies arrive at set virtual times.
//! - [`ManualClock`]: virtual time; `sleep` advances it instantly.
//! - [`RecordingSink`] / [`RecordingPublisher`]: capture events and
//!   publish calls for assertions.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use firenode::app::events::AppEvent;
use firenode::app::ports::{Clock, EventSink, PublishPort, SerialError, SerialPort};
use firenode::at::AtTransport;
use firenode::config::{AtTiming, Endpoint, SystemConfig};
use firenode::net::PublishOutcome;

// ── ScriptedPort ──────────────────────────────────────────────

#[derive(Default)]
struct PortState {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    line: Vec<u8>,
    lines: Vec<String>,
    /// Reply per command head (text before `=`).
    replies: HashMap<String, Vec<u8>>,
}

/// Cloneable handle; every clone shares the same state, so a test keeps
/// one while the transport owns another.
#[derive(Clone, Default)]
pub struct ScriptedPort {
    state: Arc<Mutex<PortState>>,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every `head` (e.g. `AT+CIPSTART`) with `reply`.
    pub fn on(&self, head: &str, reply: &[u8]) -> &Self {
        self.state.lock().unwrap().replies.insert(head.to_owned(), reply.to_vec());
        self
    }

    /// Bytes already waiting in the receive FIFO.
    pub fn preload(&self, bytes: &[u8]) -> &Self {
        self.state.lock().unwrap().rx.extend(bytes);
        self
    }

    /// Every complete line written, terminators stripped.
    pub fn lines(&self) -> Vec<String> {
        self.state.lock().unwrap().lines.clone()
    }

    /// Number of written lines that start with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }

    /// Raw bytes written.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().tx.clone()
    }

    /// Bytes still unread.
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().rx.len()
    }
}

impl SerialPort for ScriptedPort {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        let mut st = self.state.lock().unwrap();
        st.tx.extend_from_slice(bytes);
        for &b in bytes {
            if b != b'\n' {
                st.line.push(b);
                continue;
            }
            let raw = std::mem::take(&mut st.line);
            let text = String::from_utf8_lossy(&raw).trim_end_matches('\r').to_owned();
            if text.is_empty() {
                continue;
            }
            let head = text.split_once('=').map_or(text.as_str(), |(h, _)| h).to_owned();
            if let Some(reply) = st.replies.get(&head).cloned() {
                st.rx.extend(reply);
            }
            st.lines.push(text);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SerialError> {
        Ok(self.state.lock().unwrap().rx.pop_front())
    }
}

/// Replies of a healthy ESP-01 for every command the firmware sends.
pub fn healthy_radio() -> ScriptedPort {
    let port = ScriptedPort::new();
    port.on("AT", b"\r\nOK\r\n")
        .on("AT+RST", b"\r\nOK\r\n\r\nready\r\n")
        .on("AT+CWQAP", b"\r\nOK\r\n")
        .on("AT+CWMODE", b"\r\nOK\r\n")
        .on("AT+CWJAP", b"WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n")
        .on("AT+CIFSR", b"+CIFSR:STAIP,\"10.0.0.7\"\r\n\r\nOK\r\n")
        .on("AT+CIPMUX", b"\r\nOK\r\n")
        .on("AT+CIPSTART", b"CONNECT\r\n\r\nOK\r\n")
        .on("AT+CIPSEND", b"\r\nOK\r\n> ")
        .on("AT+CIPCLOSE", b"CLOSED\r\n\r\nOK\r\n");
    port
}

// ── TimedPort ─────────────────────────────────────────────────

/// Releases each chunk into the receive FIFO once the clock reaches its
/// arrival time.  Writes are accepted and ignored.
pub struct TimedPort {
    clock: Arc<ManualClock>,
    chunks: VecDeque<(Duration, Vec<u8>)>,
    rx: VecDeque<u8>,
}

impl TimedPort {
    pub fn new(clock: &Arc<ManualClock>) -> Self {
        Self {
            clock: Arc::clone(clock),
            chunks: VecDeque::new(),
            rx: VecDeque::new(),
        }
    }

    /// Deliver `bytes` at virtual time `at`.  Chunks must be added in order.
    pub fn at(mut self, at: Duration, bytes: &[u8]) -> Self {
        self.chunks.push_back((at, bytes.to_vec()));
        self
    }
}

impl SerialPort for TimedPort {
    fn write(&mut self, _bytes: &[u8]) -> Result<(), SerialError> {
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SerialError> {
        let now = self.clock.now();
        while self.chunks.front().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, bytes)) = self.chunks.pop_front() {
                self.rx.extend(bytes);
            }
        }
        Ok(self.rx.pop_front())
    }
}

// ── ManualClock ───────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.micros.fetch_add(d.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

pub type TestTransport = AtTransport<ScriptedPort, Arc<ManualClock>>;

pub fn transport(port: &ScriptedPort) -> (Arc<TestTransport>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let t = AtTransport::new(port.clone(), Arc::clone(&clock), AtTiming::default());
    (Arc::new(t), clock)
}

pub fn config() -> SystemConfig {
    let mut cfg = SystemConfig::default();
    cfg.wifi.ssid.clear();
    cfg.wifi.ssid.push_str("FireLab").unwrap();
    cfg.wifi.password.clear();
    cfg.wifi.password.push_str("hunter2hunter2").unwrap();
    cfg
}

/// Query endpoint with the stock token set.
pub fn endpoint(host: &str, port: u16) -> Endpoint {
    let mut ep = Endpoint::query(host, "/update", "KEY", "value");
    ep.port = port;
    ep
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── RecordingPublisher ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PublishCall {
    pub host: String,
    pub port: u16,
    pub request: String,
}

pub struct RecordingPublisher {
    pub calls: Mutex<Vec<PublishCall>>,
    pub outcome: PublishOutcome,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: PublishOutcome::Sent,
        }
    }

    pub fn calls(&self) -> Vec<PublishCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PublishPort for RecordingPublisher {
    fn publish(&self, endpoint: &Endpoint, request: &[u8]) -> PublishOutcome {
        self.calls.lock().unwrap().push(PublishCall {
            host: endpoint.host.to_string(),
            port: endpoint.port,
            request: String::from_utf8_lossy(request).into_owned(),
        });
        self.outcome
    }
}
