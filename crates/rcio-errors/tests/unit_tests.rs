//! Unit tests for all error variants.
//!
//! Tests Display implementations, std::error::Error implementations,
//! and From conversions.

use rcio_errors::{
    BusError, ConfigError, ConnectionError, DecodeError, ErrorCategory, ErrorSeverity,
    GpioOperation, HardwareError, RcioError,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

mod config_error_tests {
    use super::*;

    #[test]
    fn test_all_variants_display() -> TestResult {
        let variants = vec![
            ConfigError::duplicate_port(18, "left_aileron"),
            ConfigError::DuplicateName {
                name: "a_b".into(),
                label: "a-b".into(),
            },
            ConfigError::EmptyRegistry,
            ConfigError::EmptyName,
            ConfigError::InvalidDirection {
                label: "rudder".into(),
                value: 3,
            },
            ConfigError::InvalidPort {
                label: "rudder".into(),
                value: -1,
            },
            ConfigError::InvalidDefault {
                label: "rudder".into(),
                value: i64::MAX,
            },
            ConfigError::parse("expected a mapping"),
            ConfigError::Read {
                path: "/etc/rcio.yaml".into(),
                reason: "not found".into(),
            },
        ];

        for variant in variants {
            assert!(!variant.to_string().is_empty());
            let err: RcioError = variant.into();
            assert!(err.is_fatal());
            assert_eq!(err.severity(), ErrorSeverity::Critical);
        }
        Ok(())
    }

    #[test]
    fn test_config_errors_compare() -> TestResult {
        assert_eq!(
            ConfigError::duplicate_port(4, "x"),
            ConfigError::DuplicatePort {
                port: 4,
                existing: "x".into()
            }
        );
        assert_ne!(ConfigError::EmptyRegistry, ConfigError::EmptyName);
        Ok(())
    }
}

mod hardware_error_tests {
    use super::*;

    #[test]
    fn test_daemon_error_display() -> TestResult {
        let err = HardwareError::Daemon {
            operation: GpioOperation::SetMode,
            line: 99,
            code: -3,
            message: "gpio not 0-53".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("set_mode"));
        assert!(msg.contains("99"));
        assert!(msg.contains("gpio not 0-53"));
        Ok(())
    }

    #[test]
    fn test_hardware_error_is_not_fatal() -> TestResult {
        let err: RcioError = HardwareError::Disconnected.into();
        assert!(!err.is_fatal());
        assert_eq!(err.category(), ErrorCategory::Hardware);
        Ok(())
    }

    #[test]
    fn test_connection_error_is_fatal() -> TestResult {
        let err: RcioError = ConnectionError::unreachable("pi:8888", "timed out").into();
        assert!(err.is_fatal());
        assert_eq!(err.category(), ErrorCategory::Connection);
        Ok(())
    }

    #[test]
    fn test_std_error_impl() -> TestResult {
        let err = HardwareError::unsupported_line(GpioOperation::SubscribeEdges, 40);
        let _: &dyn std::error::Error = &err;
        Ok(())
    }
}

mod decode_and_bus_tests {
    use super::*;

    #[test]
    fn test_decode_error_is_recoverable() -> TestResult {
        let err = DecodeError::UnmatchedEdge { port: 23, tick: 1000 };
        assert_eq!(err.severity(), ErrorSeverity::Info);
        let err: RcioError = err.into();
        assert!(!err.is_fatal());
        assert_eq!(err.category(), ErrorCategory::Decode);
        Ok(())
    }

    #[test]
    fn test_bus_error_category() -> TestResult {
        let err: RcioError = BusError::delivery("throttle", "stdout closed").into();
        assert_eq!(err.category(), ErrorCategory::Bus);
        assert!(err.to_string().contains("throttle"));
        Ok(())
    }
}
