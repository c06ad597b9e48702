//! Concurrency tests for the local bus.

use rcio_bus::{LocalBus, MessageBus};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_concurrent_publishers() -> TestResult {
    let bus = Arc::new(LocalBus::new());
    let delivered = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&delivered);
    bus.subscribe(
        "elevator",
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    )?;

    let mut handles = vec![];
    for i in 0..8 {
        let bus = Arc::clone(&bus);
        handles.push(thread::spawn(move || {
            for v in 0..250 {
                if bus.publish("elevator", i * 1000 + v).is_err() {
                    return false;
                }
            }
            true
        }));
    }

    for handle in handles {
        assert!(matches!(handle.join(), Ok(true)), "Publisher should finish cleanly");
    }
    assert_eq!(delivered.load(Ordering::Relaxed), 2000);
    assert_eq!(bus.published(), 2000);
    Ok(())
}

#[test]
fn test_subscribe_while_publishing() -> TestResult {
    let bus = Arc::new(LocalBus::new());
    let publisher = {
        let bus = Arc::clone(&bus);
        thread::spawn(move || {
            for v in 0..1000 {
                if bus.publish("aux1", v).is_err() {
                    return false;
                }
            }
            true
        })
    };

    let mut ids = vec![];
    for _ in 0..50 {
        ids.push(bus.subscribe("aux1", Box::new(|_| {}))?);
    }
    for id in ids {
        bus.unsubscribe(id)?;
    }

    assert!(matches!(publisher.join(), Ok(true)));
    assert_eq!(bus.subscriber_count("aux1"), 0);
    Ok(())
}

#[test]
fn test_handler_may_republish() -> TestResult {
    let bus = Arc::new(LocalBus::new());
    let echoed = Arc::new(AtomicU64::new(0));

    let inner = Arc::clone(&bus);
    bus.subscribe(
        "ping",
        Box::new(move |v| inner.publish("pong", v).unwrap_or_default()),
    )?;
    let counter = Arc::clone(&echoed);
    bus.subscribe(
        "pong",
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    )?;

    bus.publish("ping", 1)?;
    assert_eq!(echoed.load(Ordering::Relaxed), 1);
    Ok(())
}
