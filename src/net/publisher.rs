//! HTTP over the radio's TCP passthrough commands.
//!
//! One publish is one locked sequence:
//!
//! ```text
//!  [CIPMUX=0] ─▶ CIPSTART ─▶ CONNECT|OK ─▶ CIPSEND=n ─▶ '>' ─▶ request ─▶ capture ─▶ CIPCLOSE
//!                    │ timeout                 │ timeout
//!                    └──▶ CIPCLOSE             └──▶ CIPCLOSE
//! ```
//!
//! The link stays locked from the first command to the final close, so
//! a concurrent publisher waits out the whole sequence.  Nothing here
//! retries; the next sample is the next attempt.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::app::ports::{Clock, PublishPort, SerialPort};
use crate::at::commands;
use crate::at::transport::{AtSession, AtTransport, CRLF};
use crate::config::{ms, Endpoint, PublishConfig, SessionTokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Request bytes were written and the session closed.  Says nothing
    /// about the HTTP status.
    Sent,
    /// No connect token within the connect budget.
    TransportTimeout,
    /// No `>` prompt after announcing the length.
    PromptNotReceived,
}

impl PublishOutcome {
    pub fn is_sent(self) -> bool {
        self == Self::Sent
    }
}

/// Stands in when the radio link never came up.  Every publish reports
/// [`PublishOutcome::TransportTimeout`] without touching any hardware, so
/// sampling and the smoke alert keep running.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflinePublisher;

impl PublishPort for OfflinePublisher {
    fn publish(&self, endpoint: &Endpoint, _request: &[u8]) -> PublishOutcome {
        debug!("PUBLISH: no radio link, dropping reading for {}", endpoint.host);
        PublishOutcome::TransportTimeout
    }
}

pub struct HttpOverAtPublisher<S, C> {
    transport: Arc<AtTransport<S, C>>,
    config: PublishConfig,
}

impl<S: SerialPort, C: Clock> HttpOverAtPublisher<S, C> {
    pub fn new(transport: Arc<AtTransport<S, C>>, config: PublishConfig) -> Self {
        Self { transport, config }
    }

    fn open(&self, at: &mut AtSession<'_, S, C>, endpoint: &Endpoint) -> bool {
        let cmd = match commands::start_tcp(&endpoint.host, endpoint.port) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("PUBLISH: {}: {}", endpoint.host, e);
                return false;
            }
        };
        at.send_command(&cmd);

        if !self.config.strict_connect {
            at.pause(ms(self.config.lenient_connect_wait_ms));
            return true;
        }
        let budget = ms(self.config.connect_budget_ms);
        match at.expect_any(&endpoint.tokens.connect[..], budget) {
            Some(_) => {
                at.pause(ms(self.config.post_connect_settle_ms));
                true
            }
            None => false,
        }
    }

    fn await_prompt(&self, at: &mut AtSession<'_, S, C>, tokens: &SessionTokens, len: usize) -> bool {
        let cmd = match commands::announce_length(len) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("PUBLISH: {}", e);
                return false;
            }
        };
        at.send_command(&cmd);

        if !self.config.strict_prompt {
            at.pause(ms(self.config.lenient_prompt_wait_ms));
            return true;
        }
        at.expect(&tokens.prompt, ms(self.config.prompt_budget_ms))
    }

    /// Consumes the close reply so a stale `OK` cannot satisfy the next
    /// publisher's connect check.
    fn close(&self, at: &mut AtSession<'_, S, C>) {
        at.send_command(commands::CLOSE_SESSION);
        at.drain(ms(self.config.close_settle_ms));
    }
}

impl<S: SerialPort, C: Clock> PublishPort for HttpOverAtPublisher<S, C> {
    fn publish(&self, endpoint: &Endpoint, request: &[u8]) -> PublishOutcome {
        let (host, port) = (endpoint.host.as_str(), endpoint.port);
        let tokens = &endpoint.tokens;
        let mut at = self.transport.session();

        if self.config.single_connection_mode {
            at.send_command(commands::SINGLE_CONNECTION);
            at.drain(ms(self.transport.timing().drain_ms));
        }

        if !self.open(&mut at, endpoint) {
            warn!("PUBLISH: connect to {}:{} timed out", host, port);
            self.close(&mut at);
            return PublishOutcome::TransportTimeout;
        }

        if !self.await_prompt(&mut at, tokens, request.len()) {
            warn!("PUBLISH: no '{}' prompt from {}", tokens.prompt, host);
            self.close(&mut at);
            return PublishOutcome::PromptNotReceived;
        }

        at.write_raw(request);
        at.write_raw(CRLF);

        let acknowledged = at.watch(&tokens.sent, ms(self.config.response_window_ms));
        if acknowledged {
            debug!("PUBLISH: {} acknowledged {} bytes", host, request.len());
        } else {
            info!("PUBLISH: no {} from {} (diagnostic only)", tokens.sent, host);
        }

        self.close(&mut at);
        PublishOutcome::Sent
    }
}
