//! Line-oriented AT command transport.
//!
//! ```text
//!  AtTransport ──session()──▶ AtSession ──▶ SerialGuard ──▶ UART
//!      │                         │
//!      └─ Clock (injected)       └─ send_command · read_response · expect
//! ```
//!
//! All I/O methods live on [`AtSession`], which can only be obtained by
//! locking the [`SerialChannel`].  Holding the session *is* holding the
//! link, so "caller must hold the lock" is enforced by the borrow checker
//! rather than by convention.
//!
//! Timeouts are the only failure signal.  A silent radio and an absent
//! radio look the same from here.
//!
//! ## Token matching
//!
//! `expect` reads in windows of `expect_window_ms` and searches each
//! window's capture on its own.  A token split across two captures is
//! not seen.  Since captures also end at every `\n`, this only bites for
//! tokens delivered slowly enough to straddle a window boundary, and the
//! radio's tokens are short single-line literals.

use core::time::Duration;

use log::{debug, warn};

use super::channel::{ReadByte, SerialChannel, SerialGuard};
use super::response::{Capture, LINE_END};
use crate::app::ports::{Clock, SerialPort};
use crate::config::{ms, AtTiming};

/// Two-byte terminator appended to every command line.
pub const CRLF: &[u8] = b"\r\n";

/// Owns the serial link and the clock.  Share it between tasks with an
/// `Arc`; every exchange goes through [`AtTransport::session`].
pub struct AtTransport<S, C> {
    channel: SerialChannel<S>,
    clock: C,
    timing: AtTiming,
}

impl<S: SerialPort, C: Clock> AtTransport<S, C> {
    pub fn new(port: S, clock: C, timing: AtTiming) -> Self {
        Self {
            channel: SerialChannel::new(port),
            clock,
            timing,
        }
    }

    /// Lock the link for a multi-command exchange, blocking until any
    /// other holder is done.
    pub fn session(&self) -> AtSession<'_, S, C> {
        AtSession {
            link: self.channel.acquire(),
            clock: &self.clock,
            timing: &self.timing,
        }
    }

    /// Like [`session`](Self::session) but gives up after `timeout`.
    pub fn try_session_for(&self, timeout: Duration) -> Option<AtSession<'_, S, C>> {
        let link = self.channel.try_acquire_for(timeout, &self.clock)?;
        Some(AtSession {
            link,
            clock: &self.clock,
            timing: &self.timing,
        })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn timing(&self) -> &AtTiming {
        &self.timing
    }

    /// Boot-time readiness check: discard pending output, send `AT`,
    /// and wait for `OK`.
    pub fn probe(&self) -> bool {
        let mut at = self.session();
        at.drain(ms(self.timing.drain_ms));
        at.send_command(super::commands::PROBE);
        at.expect("OK", ms(self.timing.probe_budget_ms))
    }

    /// Take the port back out (tests, shutdown).
    pub fn into_port(self) -> S {
        self.channel.into_inner()
    }
}

/// One locked exchange with the radio.  Dropping it releases the link.
pub struct AtSession<'a, S, C> {
    link: SerialGuard<'a, S>,
    clock: &'a C,
    timing: &'a AtTiming,
}

impl<S: SerialPort, C: Clock> AtSession<'_, S, C> {
    /// Write `text` followed by CRLF.
    pub fn send_command(&mut self, text: &str) {
        debug!(">>> {}", text);
        self.link.write(text.as_bytes());
        self.link.write(CRLF);
    }

    /// Write bytes verbatim (HTTP payload after the `>` prompt).
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.link.write(bytes);
    }

    /// Gather bytes until a `\n`, a full buffer, or `max_timeout`.
    ///
    /// The deadline is measured from entry; with a zero timeout nothing
    /// is read.  Between empty polls the task sleeps for the configured
    /// poll interval, so waiting never spins.
    pub fn read_response(&mut self, max_timeout: Duration) -> Capture {
        let start = self.clock.now();
        let poll = ms(self.timing.byte_poll_ms);
        let mut cap = Capture::new();

        while !cap.is_full() {
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= max_timeout {
                break;
            }
            match self.link.try_read_byte() {
                ReadByte::Byte(b) => {
                    cap.push(b);
                    if b == LINE_END {
                        break;
                    }
                }
                ReadByte::NoData => self.clock.sleep(poll.min(max_timeout - elapsed)),
            }
        }

        if !cap.is_empty() {
            debug!("<<< {}", cap.printable());
        }
        if cap.is_truncated() {
            warn!("AT: response truncated at {} bytes", cap.len());
        }
        cap
    }

    /// Wait up to `max_timeout` for a capture containing `token`.
    pub fn expect(&mut self, token: &str, max_timeout: Duration) -> bool {
        self.expect_any(&[token], max_timeout).is_some()
    }

    /// Wait up to `max_timeout` for any of `tokens`; returns the index of
    /// the first token found in the matching capture.
    pub fn expect_any<T: AsRef<str>>(&mut self, tokens: &[T], max_timeout: Duration) -> Option<usize> {
        let start = self.clock.now();
        let window = ms(self.timing.expect_window_ms);
        loop {
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= max_timeout {
                return None;
            }
            let cap = self.read_response(window.min(max_timeout - elapsed));
            if cap.is_empty() {
                continue;
            }
            if let Some(i) = tokens.iter().position(|t| cap.contains(t.as_ref())) {
                return Some(i);
            }
        }
    }

    /// Read and log everything that arrives during `window`.
    /// Returns the number of bytes discarded.
    pub fn drain(&mut self, window: Duration) -> usize {
        let mut total = 0;
        self.each_capture(window, |cap| total += cap.len());
        total
    }

    /// Read everything that arrives during `window` and report whether
    /// `token` appeared in any line.  Unlike [`expect`](Self::expect)
    /// this always consumes the whole window.
    pub fn watch(&mut self, token: &str, window: Duration) -> bool {
        let mut seen = false;
        self.each_capture(window, |cap| seen |= cap.contains(token));
        seen
    }

    /// Suspend the exchange without releasing the link.
    pub fn pause(&self, d: Duration) {
        self.clock.sleep(d);
    }

    fn each_capture(&mut self, window: Duration, mut f: impl FnMut(&Capture)) {
        let start = self.clock.now();
        loop {
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= window {
                break;
            }
            let cap = self.read_response(window - elapsed);
            if !cap.is_empty() {
                f(&cap);
            }
        }
    }
}
