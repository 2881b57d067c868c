//! End-to-end driver workflows over the in-memory transport.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rak3172_driver::{
    Band, DriverConfig, Error, JoinMode, MockHandle, MockTransport, Rak3172, RetryPolicy,
};

fn test_driver() -> (Rak3172<MockTransport>, MockHandle) {
    let (transport, handle) = MockTransport::new();
    let config = DriverConfig {
        response_timeout: Duration::from_millis(20),
        poll_interval: Duration::from_millis(2),
        init_retry: RetryPolicy { attempts: 5, delay: Duration::from_millis(2) },
        ..DriverConfig::default()
    };
    (Rak3172::with_config(transport, config), handle)
}

#[test]
fn test_init_retries_until_module_answers() {
    let (driver, handle) = test_driver();
    let pings = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pings);
    handle.set_responder(move |cmd| {
        if cmd == "AT" {
            // Stay silent for the first two probes, as a booting module does.
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                return None;
            }
            return Some("OK".to_string());
        }
        Some("OK".to_string())
    });

    driver.init().unwrap();

    assert_eq!(pings.load(Ordering::SeqCst), 3);
    assert!(handle.written_text().ends_with("AT+NWM=1\n"));
}

#[test]
fn test_init_gives_up_after_retry_budget() {
    let (driver, _handle) = test_driver();

    let err = driver.init().unwrap_err();
    assert!(matches!(err, Error::CommandFailed { .. }));
}

#[test]
fn test_join_requires_otaa_mode() {
    let (driver, handle) = test_driver();
    handle.set_responder(|_| Some("OK".to_string()));

    driver.set_join_mode(JoinMode::Abp).unwrap();
    let before = handle.written_text();

    assert!(matches!(driver.join(), Err(Error::WrongJoinMode)));
    assert_eq!(handle.written_text(), before);
}

#[test]
fn test_join_emits_stock_command() {
    let (driver, handle) = test_driver();
    handle.set_responder(|_| Some("OK".to_string()));

    driver.join().unwrap();
    assert_eq!(handle.written_text(), "AT+JOIN=1:0:7:10\n");
}

#[test]
fn test_join_rejects_short_retry_interval() {
    let (driver, handle) = test_driver();
    handle.set_responder(|_| Some("OK".to_string()));

    assert!(matches!(
        driver.join_with(true, false, 6, 10),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(handle.written_text(), "");
}

#[test]
fn test_wait_for_join_sees_poller_event() {
    let (driver, handle) = test_driver();
    let poller = driver.start_polling();

    let injector = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        handle.push_line("+EVT:JOINED");
    });

    driver.wait_for_join(Duration::from_secs(2)).unwrap();
    assert!(driver.is_joined());

    injector.join().unwrap();
    poller.shutdown();
}

#[test]
fn test_wait_for_join_times_out() {
    let (driver, _handle) = test_driver();

    let err = driver.wait_for_join(Duration::from_millis(150)).unwrap_err();
    assert!(matches!(err, Error::JoinTimeout));
}

#[test]
fn test_join_failed_event_fires_callback() {
    let (driver, handle) = test_driver();
    let outcome = Arc::new(AtomicBool::new(true));
    let seen = Arc::clone(&outcome);
    driver.on_join(move |joined| seen.store(joined, Ordering::SeqCst));

    let poller = driver.start_polling();
    handle.push_line("+EVT:JOIN_FAILED");

    let deadline = Instant::now() + Duration::from_secs(2);
    while outcome.load(Ordering::SeqCst) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    poller.shutdown();

    assert!(!outcome.load(Ordering::SeqCst));
    assert!(!driver.is_joined());
}

#[test]
fn test_send_encodes_payload_and_reports_length() {
    let (driver, handle) = test_driver();
    handle.set_responder(|_| Some("OK".to_string()));

    let sent = driver.send("Hello", 2).unwrap();
    assert_eq!(sent, 5);
    assert_eq!(handle.written_text(), "AT+SEND=2:48656c6c6f\n");
}

#[test]
fn test_send_validations_produce_no_traffic() {
    let (driver, handle) = test_driver();
    handle.set_responder(|_| Some("OK".to_string()));

    assert!(matches!(driver.send("hi", 0), Err(Error::InvalidArgument(_))));
    assert!(matches!(driver.send("hi", 234), Err(Error::InvalidArgument(_))));
    assert!(matches!(driver.send("", 1), Err(Error::InvalidArgument(_))));
    assert!(matches!(
        driver.send_bytes(&[0u8; 251], 1),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(handle.written_text(), "");

    // 250 bytes encodes to exactly 500 hex characters.
    driver.send_bytes(&[0u8; 250], 1).unwrap();
    assert!(!handle.written_text().is_empty());
}

#[test]
fn test_tx_done_event_fires_send_callback() {
    let (driver, handle) = test_driver();
    let confirmations = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&confirmations);
    driver.on_send(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let poller = driver.start_polling();
    handle.push_line("+EVT:TX_DONE");

    let deadline = Instant::now() + Duration::from_secs(2);
    while confirmations.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    poller.shutdown();

    assert_eq!(confirmations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_flush_clears_inbox() {
    let (driver, handle) = test_driver();
    handle.set_responder(|_| Some("OK".to_string()));
    handle.push_line("+EVT:RX_1:-38:13:UNICAST:1:48656c6c6f");

    // A round trip siphons the pending event into the inbox.
    driver.set_band(Band::Eu868).unwrap();
    assert_eq!(driver.available(), 1);

    driver.flush().unwrap();
    assert_eq!(driver.available(), 0);
    assert!(driver.read().is_empty());
}

/// Commands from several threads and events injected mid-flight must come
/// out as if each actor had the port to itself: every command line intact
/// on the wire, every frame in the inbox, nothing interleaved byte-wise.
#[test]
fn test_concurrent_commands_and_events_stay_whole() {
    const COMMANDS_PER_THREAD: usize = 20;
    const EVENT_FRAMES: usize = 15;

    let (driver, handle) = test_driver();
    handle.set_responder(|_| Some("OK".to_string()));

    let poller = driver.start_polling();

    let injector = {
        let handle = handle.clone();
        thread::spawn(move || {
            for i in 0..EVENT_FRAMES {
                let payload = rak3172_protocol::hex::encode(format!("frame{i:02}").as_bytes());
                handle.push_line(&format!("+EVT:RX_1:-40:10:UNICAST:7:{payload}"));
                thread::sleep(Duration::from_millis(3));
            }
        })
    };

    let senders: Vec<_> = (0..2)
        .map(|t| {
            let driver = driver.clone();
            thread::spawn(move || {
                for i in 0..COMMANDS_PER_THREAD {
                    let alias = format!("t{t}c{i:02}");
                    driver.set_device_alias(&alias).unwrap();
                }
            })
        })
        .collect();

    for sender in senders {
        sender.join().unwrap();
    }
    injector.join().unwrap();

    // Give the poller time to drain any frames still buffered.
    let deadline = Instant::now() + Duration::from_secs(2);
    while driver.available() < EVENT_FRAMES && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    poller.shutdown();

    let written = handle.written_text();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2 * COMMANDS_PER_THREAD);
    for t in 0..2 {
        for i in 0..COMMANDS_PER_THREAD {
            let expected = format!("AT+ALIAS=t{t}c{i:02}");
            assert!(lines.contains(&expected.as_str()), "missing line {expected}");
        }
    }

    let frames = driver.read();
    assert_eq!(frames.len(), EVENT_FRAMES);
    let mut payloads: Vec<String> = frames.iter().map(|f| f.payload_text()).collect();
    payloads.sort();
    let expected: Vec<String> = (0..EVENT_FRAMES).map(|i| format!("frame{i:02}")).collect();
    assert_eq!(payloads, expected);
}
