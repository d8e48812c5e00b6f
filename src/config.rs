//! System configuration parameters
//!
//! Every threshold, endpoint, token set and timing budget the node uses
//! lives here, so the smoke and flame paths share one implementation and
//! differ only by the values below.

use core::time::Duration;

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Short protocol literal such as `WIFI CONNECTED` or `>`.
pub type Token = String<24>;

/// Build a [`Token`] from a literal, truncating anything past capacity.
pub fn token(s: &str) -> Token {
    let mut t = Token::new();
    for c in s.chars() {
        if t.push(c).is_err() {
            break;
        }
    }
    t
}

/// Millisecond config field as a [`Duration`].
pub fn ms(v: u32) -> Duration {
    Duration::from_millis(u64::from(v))
}

fn string<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ── WiFi join ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: String<32>,
    pub password: String<64>,
    /// Send `AT+CWQAP` before the reset.
    pub quit_before_reset: bool,
    /// Wait after `AT+RST` before talking to the radio again (ms).
    pub reset_settle_ms: u32,
    /// Wait after `AT+CWMODE=1` before draining its reply (ms).
    pub mode_settle_ms: u32,
    /// Budget for the join tokens after `AT+CWJAP` (ms).
    pub join_budget_ms: u32,
    /// Tokens accepted as a successful join.
    pub join_tokens: Vec<Token, 4>,
    /// Issue `AT+CIFSR` once connected and log the address.
    pub query_address: bool,
}

// ── AT transport timing ───────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtTiming {
    /// Sleep between empty single-byte polls (ms).
    pub byte_poll_ms: u32,
    /// Window handed to each `read_response` call inside `expect` (ms).
    pub expect_window_ms: u32,
    /// Window used when draining unsolicited output (ms).
    pub drain_ms: u32,
    /// Budget for the `AT` → `OK` readiness probe (ms).
    pub probe_budget_ms: u32,
}

// ── HTTP-over-AT publishing ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Send `AT+CIPMUX=0` before every session.
    pub single_connection_mode: bool,
    /// Wait for a connect token after `AT+CIPSTART`.  When false the
    /// publisher sleeps `lenient_connect_wait_ms` instead.
    pub strict_connect: bool,
    /// Wait for the `>` prompt after `AT+CIPSEND`.  When false the
    /// publisher sleeps `lenient_prompt_wait_ms` instead.
    pub strict_prompt: bool,
    pub connect_budget_ms: u32,
    pub prompt_budget_ms: u32,
    pub lenient_connect_wait_ms: u32,
    pub lenient_prompt_wait_ms: u32,
    /// Pause between a confirmed connect and `AT+CIPSEND` (ms).
    pub post_connect_settle_ms: u32,
    /// Diagnostic capture window after the request bytes (ms).
    pub response_window_ms: u32,
    /// Pause after `AT+CIPCLOSE` before releasing the link (ms).
    pub close_settle_ms: u32,
}

// ── Endpoints ─────────────────────────────────────────────────

/// Shape of the HTTP request built for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestFormat {
    /// `GET <path>?api_key=<key>&<field>=<value>` on a single line.
    Query,
    /// `POST <path> HTTP/1.1` with a form-encoded `<field>=<value>` body.
    Form,
}

/// Literals the radio prints while a publish to one endpoint progresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Any of these after `AT+CIPSTART` means the session is open.
    pub connect: Vec<Token, 4>,
    /// Ready-to-receive prompt after `AT+CIPSEND`.
    pub prompt: Token,
    /// Acknowledgement after the request bytes.  Diagnostic only.
    pub sent: Token,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String<64>,
    pub port: u16,
    pub path: String<64>,
    pub api_key: String<32>,
    /// Query/form field that carries the value (`value`, `status`, ...).
    pub field: String<16>,
    pub format: RequestFormat,
    pub tokens: SessionTokens,
}

// ── Sensors ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmokeConfig {
    /// Raw ADC value above which the alert output is asserted.
    pub threshold: u16,
    pub period_ms: u32,
    /// Shorter retry delay after a failed ADC read (ms).
    pub read_retry_ms: u32,
    pub endpoint: Endpoint,
}

/// Whether a flame reading of "not detected" is published.
///
/// Firmware revisions disagreed, so both behaviours are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlamePublishPolicy {
    /// Publish every period, `1` or `0`.
    Always,
    /// Publish only while flame is detected.
    OnDetection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlameConfig {
    pub period_ms: u32,
    pub policy: FlamePublishPolicy,
    pub endpoint: Endpoint,
}

// ── Root ──────────────────────────────────────────────────────

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub wifi: WifiConfig,
    pub at: AtTiming,
    pub publish: PublishConfig,
    pub smoke: SmokeConfig,
    pub flame: FlameConfig,
}

impl Default for WifiConfig {
    fn default() -> Self {
        let mut join_tokens = Vec::new();
        join_tokens.push(token("WIFI CONNECTED")).ok();
        join_tokens.push(token("OK")).ok();
        Self {
            ssid: string(option_env!("FIRENODE_WIFI_SSID").unwrap_or("YOUR_SSID")),
            password: string(option_env!("FIRENODE_WIFI_PASS").unwrap_or("YOUR_PASS")),
            quit_before_reset: false,
            reset_settle_ms: 2000,
            mode_settle_ms: 500,
            join_budget_ms: 10_000,
            join_tokens,
            query_address: true,
        }
    }
}

impl Default for AtTiming {
    fn default() -> Self {
        Self {
            byte_poll_ms: 10,
            expect_window_ms: 500,
            drain_ms: 500,
            probe_budget_ms: 2000,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            single_connection_mode: false,
            strict_connect: true,
            strict_prompt: true,
            connect_budget_ms: 5000,
            prompt_budget_ms: 3000,
            lenient_connect_wait_ms: 5000,
            lenient_prompt_wait_ms: 2000,
            post_connect_settle_ms: 200,
            response_window_ms: 3000,
            close_settle_ms: 200,
        }
    }
}

impl Default for SessionTokens {
    fn default() -> Self {
        let mut connect = Vec::new();
        connect.push(token("CONNECT")).ok();
        connect.push(token("OK")).ok();
        Self {
            connect,
            prompt: token(">"),
            sent: token("SEND OK"),
        }
    }
}

impl Endpoint {
    pub fn query(host: &str, path: &str, api_key: &str, field: &str) -> Self {
        Self {
            host: string(host),
            port: 80,
            path: string(path),
            api_key: string(api_key),
            field: string(field),
            format: RequestFormat::Query,
            tokens: SessionTokens::default(),
        }
    }
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            threshold: 1500,
            period_ms: 5000,
            read_retry_ms: 1000,
            endpoint: Endpoint::query("api.thingspeak.com", "/update", "YOUR_API_KEY", "value"),
        }
    }
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            period_ms: 5000,
            policy: FlamePublishPolicy::Always,
            endpoint: Endpoint::query("api.thingspeak.com", "/update", "YOUR_API_KEY", "status"),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            wifi: WifiConfig::default(),
            at: AtTiming::default(),
            publish: PublishConfig::default(),
            smoke: SmokeConfig::default(),
            flame: FlameConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |field| Err(ConfigError::ValidationFailed(field));

        if self.at.byte_poll_ms == 0 {
            return fail("at.byte_poll_ms must be > 0");
        }
        if self.at.expect_window_ms == 0 {
            return fail("at.expect_window_ms must be > 0");
        }
        if self.wifi.join_tokens.is_empty() || self.wifi.join_tokens.iter().any(|t| t.is_empty()) {
            return fail("wifi.join_tokens must be non-empty literals");
        }
        if self.smoke.threshold > crate::sensors::ADC_MAX {
            return fail("smoke.threshold exceeds 12-bit ADC range");
        }
        if self.smoke.period_ms == 0 || self.flame.period_ms == 0 {
            return fail("sensor period must be > 0");
        }
        for ep in [&self.smoke.endpoint, &self.flame.endpoint] {
            if ep.host.is_empty() {
                return fail("endpoint.host must not be empty");
            }
            if ep.port == 0 {
                return fail("endpoint.port must be > 0");
            }
            if !ep.path.starts_with('/') {
                return fail("endpoint.path must start with '/'");
            }
            if ep.field.is_empty() {
                return fail("endpoint.field must not be empty");
            }
            let t = &ep.tokens;
            if t.connect.is_empty() || t.connect.iter().any(|c| c.is_empty()) {
                return fail("endpoint.tokens.connect must be non-empty literals");
            }
            if t.prompt.is_empty() || t.sent.is_empty() {
                return fail("endpoint.tokens.prompt/sent must not be empty");
            }
        }
        Ok(())
    }
}
