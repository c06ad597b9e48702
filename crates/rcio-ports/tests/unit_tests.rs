//! Unit tests for port registration.

use std::collections::BTreeMap;

use rcio_errors::ConfigError;
use rcio_ports::{DEFAULT_PULSE_WIDTH_US, Direction, PortId, PortRegistry, RawPortEntry};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn entries(yaml: &str) -> Result<BTreeMap<String, RawPortEntry>, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

mod from_entries {
    use super::*;

    #[test]
    fn test_mixed_configuration() -> TestResult {
        let raw = entries(
            r"
left-aileron!: { port: 18, dir: 0, default: 1200 }
elevator: { port: 19, dir: 0 }
throttle: { port: 23, dir: 1 }
",
        )?;
        let registry = PortRegistry::from_entries(&raw)?;

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.outputs().count(), 2);
        assert_eq!(registry.inputs().count(), 1);

        let aileron = registry.by_name("left_aileron_").ok_or("aileron missing")?;
        assert_eq!(aileron.id(), PortId::new(18));
        assert_eq!(aileron.label(), "left-aileron!");
        assert_eq!(aileron.default_pulse_width(), Some(1200));

        let elevator = registry.get(PortId::new(19)).ok_or("elevator missing")?;
        assert_eq!(elevator.default_pulse_width(), Some(DEFAULT_PULSE_WIDTH_US));

        let throttle = registry.by_name("throttle").ok_or("throttle missing")?;
        assert_eq!(throttle.direction(), Direction::Input);
        assert_eq!(throttle.default_pulse_width(), None);
        Ok(())
    }

    #[test]
    fn test_duplicate_port_aborts_pass() -> TestResult {
        let raw = entries(
            r"
a: { port: 4, dir: 0 }
b: { port: 4, dir: 1 }
",
        )?;
        let result = PortRegistry::from_entries(&raw);
        assert!(matches!(
            result,
            Err(ConfigError::DuplicatePort { port: 4, ref existing }) if existing == "a"
        ));
        Ok(())
    }

    #[test]
    fn test_all_malformed_entries_is_empty_registry() -> TestResult {
        let raw = entries(
            r"
PigpiodIP: { host: localhost }
orphan: { port: 4 }
no_port: { dir: 1 }
",
        )?;
        let result = PortRegistry::from_entries(&raw);
        assert!(matches!(result, Err(ConfigError::EmptyRegistry)));
        Ok(())
    }

    #[test]
    fn test_entries_without_keys_are_skipped() -> TestResult {
        let raw = entries(
            r"
orphan: { default: 1000 }
rudder: { port: 12, dir: 0 }
",
        )?;
        let registry = PortRegistry::from_entries(&raw)?;
        assert_eq!(registry.len(), 1);
        assert!(registry.by_name("orphan").is_none());
        Ok(())
    }

    #[test]
    fn test_invalid_direction_aborts_pass() -> TestResult {
        let raw = entries(
            r"
good: { port: 4, dir: 0 }
bad: { port: 5, dir: 2 }
",
        )?;
        let result = PortRegistry::from_entries(&raw);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDirection { value: 2, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_negative_port_is_invalid() -> TestResult {
        let raw = entries("bad: { port: -3, dir: 1 }")?;
        let result = PortRegistry::from_entries(&raw);
        assert!(matches!(result, Err(ConfigError::InvalidPort { value: -3, .. })));
        Ok(())
    }

    #[test]
    fn test_oversized_default_is_invalid() -> TestResult {
        let raw = entries("bad: { port: 3, dir: 0, default: 9999999999 }")?;
        let result = PortRegistry::from_entries(&raw);
        assert!(matches!(result, Err(ConfigError::InvalidDefault { .. })));
        Ok(())
    }

    #[test]
    fn test_colliding_sanitized_names_rejected() -> TestResult {
        let raw = entries(
            r"
gear-up: { port: 4, dir: 0 }
gear_up: { port: 5, dir: 0 }
",
        )?;
        let result = PortRegistry::from_entries(&raw);
        assert!(matches!(result, Err(ConfigError::DuplicateName { ref name, .. }) if name == "gear_up"));
        Ok(())
    }
}

mod builder {
    use super::*;

    #[test]
    fn test_sanitized_name_examples() -> TestResult {
        let mut builder = PortRegistry::builder();
        let renamed = builder.register("left-aileron!", PortId::new(18), Direction::Output, None)?;
        assert_eq!(renamed.name(), "left_aileron_");
        assert!(renamed.was_renamed());

        let clean = builder.register("throttle", PortId::new(23), Direction::Input, None)?;
        assert_eq!(clean.name(), "throttle");
        assert!(!clean.was_renamed());
        Ok(())
    }

    #[test]
    fn test_empty_label_rejected() {
        let mut builder = PortRegistry::builder();
        let result = builder.register("", PortId::new(1), Direction::Input, None);
        assert!(matches!(result, Err(ConfigError::EmptyName)));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_input_ignores_default() -> TestResult {
        let mut builder = PortRegistry::builder();
        let port = builder.register("ch1", PortId::new(6), Direction::Input, Some(1100))?;
        assert_eq!(port.default_pulse_width(), None);
        Ok(())
    }

    #[test]
    fn test_iteration_is_ordered_by_line() -> TestResult {
        let mut builder = PortRegistry::builder();
        builder.register("c", PortId::new(30), Direction::Output, None)?;
        builder.register("a", PortId::new(2), Direction::Input, None)?;
        builder.register("b", PortId::new(17), Direction::Output, None)?;
        let registry = builder.build()?;
        let lines: Vec<u32> = registry.iter().map(|p| p.id().line()).collect();
        assert_eq!(lines, vec![2, 17, 30]);
        Ok(())
    }
}
