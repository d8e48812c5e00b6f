//! AT command lines understood by the ESP-01 firmware.
//!
//! Fixed commands are plain literals; parameterised ones are rendered
//! into a fixed-capacity [`Command`].  The transport appends the line
//! terminator, so nothing here ends in CRLF.

use core::fmt::Write;

use heapless::String;

use crate::error::FormatError;

/// Capacity of one rendered command line.
pub const COMMAND_CAPACITY: usize = 160;

pub type Command = String<COMMAND_CAPACITY>;

/// Readiness probe, answered with `OK`.
pub const PROBE: &str = "AT";
/// Soft reset; the module reboots and prints a banner.
pub const RESET: &str = "AT+RST";
/// Leave the current access point.
pub const QUIT_AP: &str = "AT+CWQAP";
/// Station mode.
pub const STATION_MODE: &str = "AT+CWMODE=1";
/// Print the station IP/MAC.
pub const SHOW_ADDRESS: &str = "AT+CIFSR";
/// Single-connection mode, required before a plain `AT+CIPSTART`.
pub const SINGLE_CONNECTION: &str = "AT+CIPMUX=0";
/// Tear down the TCP session.
pub const CLOSE_SESSION: &str = "AT+CIPCLOSE";

/// `AT+CWJAP="<ssid>","<password>"` with AT string escaping.
pub fn join(ssid: &str, password: &str) -> Result<Command, FormatError> {
    let mut cmd = Command::new();
    cmd.push_str("AT+CWJAP=\"").map_err(|_| FormatError::CommandTooLong)?;
    push_escaped(&mut cmd, ssid)?;
    cmd.push_str("\",\"").map_err(|_| FormatError::CommandTooLong)?;
    push_escaped(&mut cmd, password)?;
    cmd.push('"').map_err(|_| FormatError::CommandTooLong)?;
    Ok(cmd)
}

/// `AT+CIPSTART="TCP","<host>",<port>`
pub fn start_tcp(host: &str, port: u16) -> Result<Command, FormatError> {
    let mut cmd = Command::new();
    write!(cmd, "AT+CIPSTART=\"TCP\",\"{}\",{}", host, port).map_err(|_| FormatError::CommandTooLong)?;
    Ok(cmd)
}

/// `AT+CIPSEND=<n>`
pub fn announce_length(n: usize) -> Result<Command, FormatError> {
    let mut cmd = Command::new();
    write!(cmd, "AT+CIPSEND={}", n).map_err(|_| FormatError::CommandTooLong)?;
    Ok(cmd)
}

/// The module's string parser treats `"`, `,` and `\` as syntax.
fn push_escaped(cmd: &mut Command, s: &str) -> Result<(), FormatError> {
    for c in s.chars() {
        if matches!(c, '"' | ',' | '\\') {
            cmd.push('\\').map_err(|_| FormatError::CommandTooLong)?;
        }
        cmd.push(c).map_err(|_| FormatError::CommandTooLong)?;
    }
    Ok(())
}
