//! One radio, many callers: AT exchanges never interleave.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use firenode::app::ports::PublishPort;
use firenode::config::PublishConfig;
use firenode::net::{HttpOverAtPublisher, PublishOutcome, WifiSession};

use crate::mock_hw::{config, endpoint, healthy_radio, transport, RecordingSink};

/// Every publish must appear as one uninterrupted
/// CIPSTART, CIPSEND, GET, CIPCLOSE block.
fn assert_contiguous_blocks(lines: &[String], blocks: usize) {
    let publish: Vec<&String> = lines
        .iter()
        .filter(|l| {
            l.starts_with("AT+CIPSTART")
                || l.starts_with("AT+CIPSEND")
                || l.starts_with("GET ")
                || l.starts_with("AT+CIPCLOSE")
        })
        .collect();
    assert_eq!(publish.len(), blocks * 4, "lines: {:#?}", lines);
    for block in publish.chunks(4) {
        assert!(block[0].starts_with("AT+CIPSTART"), "{:#?}", block);
        assert!(block[1].starts_with("AT+CIPSEND"), "{:#?}", block);
        assert!(block[2].starts_with("GET "), "{:#?}", block);
        assert!(block[3].starts_with("AT+CIPCLOSE"), "{:#?}", block);
    }
}

#[test]
fn concurrent_publishes_do_not_interleave() {
    let port = healthy_radio();
    let (t, _clock) = transport(&port);
    let publisher = Arc::new(HttpOverAtPublisher::new(t, PublishConfig::default()));

    let outcomes: Vec<PublishOutcome> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let publisher = Arc::clone(&publisher);
                s.spawn(move || {
                    let request = format!("GET /update?api_key=K&value={}\r\n", i);
                    publisher.publish(&endpoint("api.thingspeak.com", 80), request.as_bytes())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(outcomes.iter().all(|o| o.is_sent()));
    assert_contiguous_blocks(&port.lines(), 4);
}

#[test]
fn join_and_publish_sequences_stay_whole() {
    let port = healthy_radio();
    let (t, _clock) = transport(&port);
    let publisher = HttpOverAtPublisher::new(Arc::clone(&t), PublishConfig::default());

    thread::scope(|s| {
        s.spawn(|| {
            let mut wifi = WifiSession::new(config().wifi);
            wifi.connect(&t, &mut RecordingSink::new());
        });
        s.spawn(|| {
            let ep = endpoint("api.thingspeak.com", 80);
            for _ in 0..3 {
                publisher.publish(&ep, b"GET /update?api_key=K&status=1\r\n");
            }
        });
    });

    assert_contiguous_blocks(&port.lines(), 3);
}

#[test]
fn timed_acquire_gives_up_while_link_is_held() {
    let port = healthy_radio();
    let (t, _clock) = transport(&port);
    let (held_tx, held_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    thread::scope(|s| {
        let t = &t;
        s.spawn(move || {
            let mut at = t.session();
            at.send_command("AT");
            held_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        });

        held_rx.recv().unwrap();
        assert!(t.try_session_for(Duration::from_millis(50)).is_none());
        release_tx.send(()).unwrap();
    });

    let mut at = t
        .try_session_for(Duration::from_millis(50))
        .expect("link is free again");
    assert!(at.expect("OK", Duration::from_millis(500)));
}
