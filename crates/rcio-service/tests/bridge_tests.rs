//! Stdio bridge behaviour

use std::collections::BTreeSet;
use std::io::Cursor;
use std::sync::Arc;

use rcio_bus::{LocalBus, MessageBus};
use rcio_service::bridge::{BusMessage, forward_topics, publish_lines, write_messages};
use rcio_test_helpers::prelude::*;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing_test::traced_test;

fn command_topics(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

#[test]
#[traced_test]
fn test_publish_lines_skips_bad_input() -> TestResult {
    let bus = LocalBus::new();
    let gear = BusRecorder::attach(&bus, "gear")?;
    let input = concat!(
        "{\"topic\":\"gear\",\"value\":1000}\n",
        "\n",
        "not json\n",
        "{\"topic\":\"\",\"value\":5}\n",
        "{\"topic\":\"gear\",\"value\":2000}\n",
    );

    let published = publish_lines(Cursor::new(input), &bus, &command_topics(&["gear"]))?;

    assert_eq!(published, 2);
    assert_eq!(gear.values(), vec![1000, 2000]);
    assert!(logs_contain("Ignoring stdin line"));
    Ok(())
}

#[test]
fn test_publish_lines_on_empty_input() -> TestResult {
    let bus = LocalBus::new();
    assert_eq!(publish_lines(Cursor::new(""), &bus, &command_topics(&["gear"]))?, 0);
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_stdin_cannot_inject_readings() -> TestResult {
    let bus = LocalBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscriptions = forward_topics(&bus, ["throttle"], &tx)?;
    let gear = BusRecorder::attach(&bus, "gear")?;
    let input = concat!(
        "{\"topic\":\"throttle\",\"value\":42}\n",
        "{\"topic\":\"gear\",\"value\":1800}\n",
    );

    let published = publish_lines(Cursor::new(input), &bus, &command_topics(&["gear"]))?;

    assert_eq!(published, 1);
    assert_eq!(gear.values(), vec![1800]);
    assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Empty)));
    assert!(logs_contain("is not a command topic"));
    for id in subscriptions {
        bus.unsubscribe(id)?;
    }
    Ok(())
}

#[tokio::test]
async fn test_forwarded_readings_are_written_as_lines() -> TestResult {
    let bus = Arc::new(LocalBus::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let subscriptions = forward_topics(&*bus, ["throttle", "rudder"], &tx)?;
    drop(tx);
    assert_eq!(subscriptions.len(), 2);

    bus.publish("throttle", 1502)?;
    bus.publish("elevator", 1234)?;
    bus.publish("rudder", 988)?;
    for id in subscriptions {
        bus.unsubscribe(id)?;
    }

    let mut out: Vec<u8> = Vec::new();
    let written = write_messages(rx, &mut out).await?;

    assert_eq!(written, 2);
    let text = String::from_utf8(out)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            r#"{"topic":"throttle","value":1502}"#,
            r#"{"topic":"rudder","value":988}"#,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_forward_failure_cancels_earlier_subscriptions() -> TestResult {
    let bus = FaultyBus::new();
    bus.refuse_subscribe("rudder");
    let (tx, _rx) = mpsc::unbounded_channel::<BusMessage>();

    let result = forward_topics(&bus, ["throttle", "rudder"], &tx);

    assert!(matches!(result, Err(rcio_errors::BusError::Delivery { .. })));
    assert_eq!(bus.inner().subscriber_count("throttle"), 0);
    assert_eq!(bus.unsubscribed().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_writer_bridge_shutdown_flushes() -> TestResult {
    let bus = Arc::new(LocalBus::new());
    let (mut reader, writer) = tokio::io::duplex(4096);
    let bridge = rcio_service::StdioBridge::spawn_writer(Arc::clone(&bus), ["throttle"], writer)?;
    assert_eq!(bridge.forwarded_topics(), 1);

    bus.publish("throttle", 1500)?;
    let written = bridge.shutdown().await;
    assert_eq!(written, 1);
    assert_eq!(bus.subscriber_count("throttle"), 0);

    let mut received = String::new();
    reader.read_to_string(&mut received).await?;
    assert_eq!(received, "{\"topic\":\"throttle\",\"value\":1500}\n");
    Ok(())
}
