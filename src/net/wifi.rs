//! WiFi station join over AT commands.
//!
//! ```text
//!  Idle ─▶ Resetting ─▶ ModeSet ─▶ Joining ─┬─▶ Connected
//!    │                                      └─▶ Failed
//!    └──────────── bad credentials ───────────▶ Failed
//! ```
//!
//! Each step locks the link on its own, so a long join never starves a
//! publisher that is already running.  There is no automatic retry: a
//! failed join is reported once and the node keeps sampling and
//! publishing regardless (best-effort publish, no gating on session
//! state).  Calling [`WifiSession::connect`] again restarts from Idle.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, EventSink, SerialPort};
use crate::at::commands;
use crate::at::transport::AtTransport;
use crate::config::{ms, WifiConfig};
use crate::error::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resetting,
    ModeSet,
    Joining,
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

/// 1-32 printable ASCII bytes.
pub fn validate_ssid(ssid: &str) -> Result<(), FormatError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(FormatError::InvalidCredential);
    }
    Ok(())
}

/// Empty (open network) or 8-64 bytes (WPA2).
pub fn validate_password(password: &str) -> Result<(), FormatError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(FormatError::InvalidCredential);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Session
// ───────────────────────────────────────────────────────────────

pub struct WifiSession {
    state: SessionState,
    config: WifiConfig,
}

impl WifiSession {
    pub fn new(config: WifiConfig) -> Self {
        Self {
            state: SessionState::Idle,
            config,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Run the full reset → mode → join sequence.  Returns `true` when a
    /// join token was observed within budget.
    pub fn connect<S, C, E>(&mut self, transport: &AtTransport<S, C>, sink: &mut E) -> bool
    where
        S: SerialPort,
        C: Clock,
        E: EventSink,
    {
        if self.state != SessionState::Idle {
            self.enter(SessionState::Idle, sink);
        }

        let join = match self.join_command() {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("WiFi: {} (SSID='{}'), not joining", e, self.config.ssid);
                self.enter(SessionState::Failed, sink);
                return false;
            }
        };

        let drain = ms(transport.timing().drain_ms);

        self.enter(SessionState::Resetting, sink);
        {
            let mut at = transport.session();
            if self.config.quit_before_reset {
                at.send_command(commands::QUIT_AP);
                at.drain(drain);
            }
            at.send_command(commands::RESET);
            at.pause(ms(self.config.reset_settle_ms));
            at.drain(drain);
        }

        self.enter(SessionState::ModeSet, sink);
        {
            let mut at = transport.session();
            at.send_command(commands::STATION_MODE);
            at.pause(ms(self.config.mode_settle_ms));
            // The mode reply ends in OK, which is also a join token.
            at.drain(drain);
        }

        self.enter(SessionState::Joining, sink);
        let joined = {
            let mut at = transport.session();
            at.send_command(&join);
            let hit = at.expect_any(&self.config.join_tokens[..], ms(self.config.join_budget_ms));
            // Rest of the join reply (GOT IP, OK) must not leak into the
            // first publish's connect check.
            at.drain(drain);
            hit
        };

        match joined {
            Some(i) => {
                info!("WiFi: joined '{}' ({})", self.config.ssid, self.config.join_tokens[i]);
                self.enter(SessionState::Connected, sink);
                if self.config.query_address {
                    let mut at = transport.session();
                    at.send_command(commands::SHOW_ADDRESS);
                    at.drain(drain);
                }
                true
            }
            None => {
                warn!(
                    "WiFi: no join token within {} ms, continuing without network",
                    self.config.join_budget_ms
                );
                self.enter(SessionState::Failed, sink);
                false
            }
        }
    }

    fn join_command(&self) -> Result<commands::Command, FormatError> {
        validate_ssid(&self.config.ssid)?;
        validate_password(&self.config.password)?;
        commands::join(&self.config.ssid, &self.config.password)
    }

    fn enter<E: EventSink>(&mut self, to: SessionState, sink: &mut E) {
        let from = self.state;
        self.state = to;
        sink.emit(&AppEvent::SessionChanged { from, to });
    }
}
