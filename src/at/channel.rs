//! Exclusive access to the single UART wired to the radio.
//!
//! [`SerialChannel`] owns the port behind a mutex.  Every AT exchange,
//! from one command up to a full connect/send/close publish sequence,
//! runs while holding a [`SerialGuard`], so two tasks can never
//! interleave bytes on the link.  The guard releases on drop, including
//! early returns.

use core::time::Duration;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use log::{trace, warn};

use crate::app::ports::{Clock, SerialPort};

/// Result of a non-blocking single-byte poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadByte {
    Byte(u8),
    NoData,
}

/// Poll step used while waiting for a timed acquisition.
const LOCK_POLL: Duration = Duration::from_millis(1);

pub struct SerialChannel<S> {
    port: Mutex<S>,
}

impl<S: SerialPort> SerialChannel<S> {
    pub fn new(port: S) -> Self {
        Self {
            port: Mutex::new(port),
        }
    }

    /// Block until the link is free and return a scoped handle.
    ///
    /// No fairness beyond what the underlying mutex offers.  A panic in
    /// a previous holder does not wedge the link: the poisoned lock is
    /// recovered, since the port itself holds no invariants we rely on.
    pub fn acquire(&self) -> SerialGuard<'_, S> {
        let port = self.port.lock().unwrap_or_else(PoisonError::into_inner);
        SerialGuard { port }
    }

    /// Try to take the link within `timeout`.  `None` if another holder
    /// kept it for the whole window.
    pub fn try_acquire_for(&self, timeout: Duration, clock: &impl Clock) -> Option<SerialGuard<'_, S>> {
        let start = clock.now();
        loop {
            match self.port.try_lock() {
                Ok(port) => return Some(SerialGuard { port }),
                Err(TryLockError::Poisoned(p)) => {
                    return Some(SerialGuard {
                        port: p.into_inner(),
                    });
                }
                Err(TryLockError::WouldBlock) => {}
            }
            let elapsed = clock.now().saturating_sub(start);
            if elapsed >= timeout {
                return None;
            }
            clock.sleep(LOCK_POLL.min(timeout - elapsed));
        }
    }

    /// Take the port back out (tests, shutdown).
    pub fn into_inner(self) -> S {
        self.port.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive handle to the radio link.  Dropping it releases the link.
pub struct SerialGuard<'a, S> {
    port: MutexGuard<'a, S>,
}

impl<S: SerialPort> SerialGuard<'_, S> {
    /// Push bytes out.  Driver errors are logged; the peer will simply not
    /// answer, which the caller observes as a timeout.
    pub fn write(&mut self, bytes: &[u8]) {
        if let Err(e) = self.port.write(bytes) {
            warn!("serial: write of {} bytes failed: {}", bytes.len(), e);
        }
    }

    /// Non-blocking single-byte read.
    pub fn try_read_byte(&mut self) -> ReadByte {
        match self.port.read_byte() {
            Ok(Some(b)) => ReadByte::Byte(b),
            Ok(None) => ReadByte::NoData,
            Err(e) => {
                trace!("serial: read error treated as no data: {}", e);
                ReadByte::NoData
            }
        }
    }
}
