//! Snapshot tests for error message formatting.
//!
//! These messages end up in operator-facing logs, so they are pinned.

use insta::assert_snapshot;
use rcio_errors::{
    BusError, ConfigError, ConnectionError, DecodeError, GpioOperation, HardwareError, RcioError,
};

#[test]
fn test_duplicate_port() {
    assert_snapshot!(
        ConfigError::duplicate_port(18, "left_aileron").to_string(),
        @"Port 18 is already registered as 'left_aileron'"
    );
}

#[test]
fn test_empty_registry() {
    let err: RcioError = ConfigError::EmptyRegistry.into();
    assert_snapshot!(err.to_string(), @"Configuration error: No configurable ports");
}

#[test]
fn test_invalid_direction() {
    let err = ConfigError::InvalidDirection {
        label: "rudder".into(),
        value: 2,
    };
    assert_snapshot!(
        err.to_string(),
        @"Invalid direction 2 for 'rudder': expected 0 (output) or 1 (input)"
    );
}

#[test]
fn test_daemon_write_failure() {
    let err = HardwareError::Daemon {
        operation: GpioOperation::WritePulse,
        line: 18,
        code: -8,
        message: "pulsewidth not 0 or 500-2500".into(),
    };
    assert_snapshot!(
        err.to_string(),
        @"write_pulse on line 18 failed: pulsewidth not 0 or 500-2500 (-8)"
    );
}

#[test]
fn test_unreachable() {
    assert_snapshot!(
        ConnectionError::unreachable("localhost:8888", "Connection refused").to_string(),
        @"Cannot connect to GPIO daemon at localhost:8888: Connection refused"
    );
}

#[test]
fn test_unmatched_edge() {
    assert_snapshot!(
        DecodeError::UnmatchedEdge { port: 23, tick: 4000 }.to_string(),
        @"Falling edge at tick 4000 on port 23 has no preceding rising edge"
    );
}

#[test]
fn test_unknown_subscription() {
    assert_snapshot!(BusError::UnknownSubscription(7).to_string(), @"Unknown subscription 7");
}
