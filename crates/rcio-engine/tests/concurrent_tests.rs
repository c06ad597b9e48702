//! Commands and edges arriving from different threads at once.

use std::sync::Arc;
use std::thread;

use rcio_bus::{LocalBus, MessageBus};
use rcio_engine::RcioEngine;
use rcio_pigpio::DaemonEndpoint;
use rcio_ports::PortId;
use rcio_test_helpers::prelude::*;

#[test]
fn test_commands_and_edges_interleave() -> TestResult {
    let daemon = MockGpioDaemon::new();
    let bus = Arc::new(LocalBus::new());
    let mut engine = RcioEngine::start(
        &MockConnector::new(daemon.clone()),
        &DaemonEndpoint::default(),
        mixed_registry()?,
        Arc::clone(&bus),
    )?;
    let throttle = BusRecorder::attach(bus.as_ref(), "throttle")?;
    let rudder = BusRecorder::attach(bus.as_ref(), "rudder")?;

    let mut handles = vec![];
    for topic in ["left_aileron", "gear"] {
        let bus = Arc::clone(&bus);
        handles.push(thread::spawn(move || {
            (0..200).all(|i| bus.publish(topic, 1000 + i).is_ok())
        }));
    }
    for line in [23u32, 24] {
        let daemon = daemon.clone();
        handles.push(thread::spawn(move || {
            for i in 0..200u32 {
                daemon.fire_pulse(line, i * 20_000, 1000 + i);
            }
            true
        }));
    }
    for handle in handles {
        assert!(matches!(handle.join(), Ok(true)), "Thread should finish cleanly");
    }

    assert_eq!(daemon.writes_to(18).len(), 1 + 200);
    assert_eq!(daemon.writes_to(19).len(), 1 + 200);
    assert_eq!(throttle.values().len(), 200);
    assert_eq!(rudder.values().len(), 200);
    assert_eq!(throttle.values(), (0..200).map(|i| 1000 + i).collect::<Vec<i32>>());

    let report = engine.shutdown();
    assert_eq!(report.attempted(), 2);
    assert_eq!(daemon.writes_to(18).last().copied(), Some(1500));
    assert_eq!(daemon.writes_to(19).last().copied(), Some(1000));
    assert_eq!(engine.output_pulse_width(PortId::new(18)), Some(1500));
    Ok(())
}

#[test]
fn test_shutdown_while_commands_flow() -> TestResult {
    let daemon = MockGpioDaemon::new();
    let bus = Arc::new(LocalBus::new());
    let mut engine = RcioEngine::start(
        &MockConnector::new(daemon.clone()),
        &DaemonEndpoint::default(),
        single_output_registry(12, 1400)?,
        Arc::clone(&bus),
    )?;

    let commander = {
        let bus = Arc::clone(&bus);
        thread::spawn(move || {
            for i in 0..1000 {
                if bus.publish("servo", 600 + i).is_err() {
                    return false;
                }
            }
            true
        })
    };
    let report = engine.shutdown();
    assert!(matches!(commander.join(), Ok(true)));

    assert!(report.is_clean());
    // The restore write is the last one the port ever sees.
    assert_eq!(daemon.writes_to(12).last().copied(), Some(1400));
    Ok(())
}
