//! Fuzz target: WiFi join command rendering.
//!
//! Arbitrary credentials either render into the fixed command buffer or
//! fail with an error.  A rendered command always ends with a closing
//! quote, so the radio never sees a half-written line.
//!
//! cargo fuzz run fuzz_join_command

#![no_main]

use firenode::at::commands::{join, COMMAND_CAPACITY};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let (ssid, password) = text.split_once('\0').unwrap_or((&text, ""));

    if let Ok(cmd) = join(ssid, password) {
        assert!(cmd.len() <= COMMAND_CAPACITY);
        assert!(cmd.starts_with("AT+CWJAP=\""));
        assert!(cmd.ends_with('"'));
    }
});
