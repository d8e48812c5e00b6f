//! Fuzz target: radio replies through an AT session.
//!
//! Arbitrary bytes stand in for whatever the radio prints, including
//! bootloader garbage at the wrong baud rate.  Every capture must stay
//! within its bound and the session must always give up at its deadline.
//!
//! cargo fuzz run fuzz_response_capture

#![no_main]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use firenode::app::ports::{Clock, SerialError, SerialPort};
use firenode::at::response::MAX_CAPTURE_LEN;
use firenode::at::AtTransport;
use firenode::config::AtTiming;
use libfuzzer_sys::fuzz_target;

struct Replay(VecDeque<u8>);

impl SerialPort for Replay {
    fn write(&mut self, _bytes: &[u8]) -> Result<(), SerialError> {
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>, SerialError> {
        Ok(self.0.pop_front())
    }
}

#[derive(Default)]
struct VirtualClock(AtomicU64);

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.0.load(Ordering::Relaxed))
    }

    fn sleep(&self, d: Duration) {
        self.0.fetch_add(d.as_micros() as u64, Ordering::Relaxed);
    }
}

fuzz_target!(|data: &[u8]| {
    let t = AtTransport::new(
        Replay(data.iter().copied().collect()),
        VirtualClock::default(),
        AtTiming::default(),
    );
    let mut at = t.session();

    let cap = at.read_response(Duration::from_millis(200));
    assert!(cap.len() <= MAX_CAPTURE_LEN);
    let _ = cap.printable().to_string();

    let budget = Duration::from_secs(2);
    let start = t.clock().now();
    let _ = at.expect_any(&["CONNECT", "OK", ">"], budget);
    let spent = t.clock().now() - start;
    assert!(spent <= budget + Duration::from_millis(10), "overran budget: {:?}", spent);

    let _ = at.drain(Duration::from_millis(500));
});
