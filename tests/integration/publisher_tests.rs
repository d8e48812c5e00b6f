//! HTTP-over-AT publish sequences.

use std::sync::Arc;
use std::time::Duration;

use firenode::app::ports::{Clock, PublishPort};
use firenode::config::{token, PublishConfig};
use firenode::net::{HttpOverAtPublisher, PublishOutcome};

use crate::mock_hw::{endpoint, healthy_radio, transport, ManualClock, ScriptedPort, TestTransport};

const REQUEST: &[u8] = b"GET /update?api_key=KEY&value=1600\r\n";

fn publisher(t: &Arc<TestTransport>, cfg: PublishConfig) -> HttpOverAtPublisher<ScriptedPort, Arc<ManualClock>> {
    HttpOverAtPublisher::new(Arc::clone(t), cfg)
}

#[test]
fn happy_path_runs_the_full_sequence() {
    let port = healthy_radio();
    port.on("GET /update?api_key", b"\r\nRecv 36 bytes\r\n\r\nSEND OK\r\n");
    let (t, _clock) = transport(&port);
    let p = publisher(&t, PublishConfig::default());

    assert_eq!(p.publish(&endpoint("api.thingspeak.com", 80), REQUEST), PublishOutcome::Sent);
    assert_eq!(
        port.lines(),
        vec![
            r#"AT+CIPSTART="TCP","api.thingspeak.com",80"#,
            "AT+CIPSEND=36",
            "GET /update?api_key=KEY&value=1600",
            "AT+CIPCLOSE",
        ]
    );
}

#[test]
fn announced_length_matches_request_bytes() {
    let port = healthy_radio();
    let (t, _clock) = transport(&port);
    let p = publisher(&t, PublishConfig::default());

    let form = b"POST /update HTTP/1.1\r\nHost: h\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 8\r\n\r\nstatus=1";
    p.publish(&endpoint("h", 8080), form);
    assert_eq!(port.count(&format!("AT+CIPSEND={}", form.len())), 1);
    let written = port.written();
    assert!(written.windows(form.len()).any(|w| w == form));
}

#[test]
fn connect_timeout_closes_exactly_once() {
    let port = healthy_radio();
    port.on("AT+CIPSTART", b"");
    let (t, clock) = transport(&port);
    let p = publisher(&t, PublishConfig::default());

    assert_eq!(p.publish(&endpoint("api.thingspeak.com", 80), REQUEST), PublishOutcome::TransportTimeout);
    assert_eq!(port.count("AT+CIPCLOSE"), 1);
    assert_eq!(port.count("AT+CIPSEND"), 0);
    assert!(clock.now() >= Duration::from_millis(5000));
}

#[test]
fn missing_prompt_closes_exactly_once() {
    let port = healthy_radio();
    port.on("AT+CIPSEND", b"\r\nERROR\r\n");
    let (t, _clock) = transport(&port);
    let p = publisher(&t, PublishConfig::default());

    assert_eq!(p.publish(&endpoint("api.thingspeak.com", 80), REQUEST), PublishOutcome::PromptNotReceived);
    assert_eq!(port.count("AT+CIPCLOSE"), 1);
    assert_eq!(port.count("GET "), 0, "request must not be sent without a prompt");
}

#[test]
fn lenient_mode_sends_without_tokens() {
    let port = ScriptedPort::new();
    let (t, clock) = transport(&port);
    let cfg = PublishConfig {
        strict_connect: false,
        strict_prompt: false,
        ..PublishConfig::default()
    };
    let waits = Duration::from_millis(u64::from(cfg.lenient_connect_wait_ms + cfg.lenient_prompt_wait_ms));
    let p = publisher(&t, cfg);

    assert_eq!(p.publish(&endpoint("api.thingspeak.com", 80), REQUEST), PublishOutcome::Sent);
    assert_eq!(port.count("GET "), 1);
    assert_eq!(port.count("AT+CIPCLOSE"), 1);
    assert!(clock.now() >= waits);
}

#[test]
fn single_connection_mode_is_set_first() {
    let port = healthy_radio();
    let (t, _clock) = transport(&port);
    let cfg = PublishConfig {
        single_connection_mode: true,
        ..PublishConfig::default()
    };
    let p = publisher(&t, cfg);

    p.publish(&endpoint("api.thingspeak.com", 80), REQUEST);
    assert_eq!(port.lines()[0], "AT+CIPMUX=0");
}

#[test]
fn stale_close_reply_does_not_fake_a_connect() {
    let port = healthy_radio();
    let (t, _clock) = transport(&port);
    let p = publisher(&t, PublishConfig::default());

    assert_eq!(p.publish(&endpoint("a", 80), REQUEST), PublishOutcome::Sent);
    port.on("AT+CIPSTART", b"");
    assert_eq!(p.publish(&endpoint("a", 80), REQUEST), PublishOutcome::TransportTimeout);
}

#[test]
fn connect_tokens_come_from_the_endpoint() {
    let port = healthy_radio();
    port.on("AT+CIPSTART", b"Linked\r\n");
    let (t, _clock) = transport(&port);
    let p = publisher(&t, PublishConfig::default());

    let stock = endpoint("api.thingspeak.com", 80);
    assert_eq!(p.publish(&stock, REQUEST), PublishOutcome::TransportTimeout);

    let mut legacy = endpoint("api.thingspeak.com", 80);
    legacy.tokens.connect.push(token("Linked")).unwrap();
    assert_eq!(p.publish(&legacy, REQUEST), PublishOutcome::Sent);
    assert_eq!(port.count("GET "), 1);
}

#[test]
fn prompt_token_comes_from_the_endpoint() {
    let port = healthy_radio();
    port.on("AT+CIPSEND", b"\r\nOK\r\nREADY\r\n");
    let (t, _clock) = transport(&port);
    let p = publisher(&t, PublishConfig::default());

    let mut ep = endpoint("api.thingspeak.com", 80);
    assert_eq!(p.publish(&ep, REQUEST), PublishOutcome::PromptNotReceived);

    ep.tokens.prompt = token("READY");
    assert_eq!(p.publish(&ep, REQUEST), PublishOutcome::Sent);
}
