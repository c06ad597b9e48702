//! Property-based tests for pulse clamping.

use proptest::prelude::*;
use rcio_driver::{MAX_PULSE_WIDTH_US, MIN_PULSE_WIDTH_US, PwmDriver, clamp_pulse_width};
use rcio_ports::PortId;
use rcio_test_helpers::mock::MockGpioDaemon;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_set_pulse_clamps_and_writes_once(default in any::<i32>(), requested in any::<i32>()) {
        let daemon = MockGpioDaemon::new();
        let driver = PwmDriver::new(PortId::new(12), "servo", default, daemon.clone());
        daemon.clear_calls();

        let actual = driver.set_pulse(requested);
        prop_assert!((MIN_PULSE_WIDTH_US..=MAX_PULSE_WIDTH_US).contains(&actual));
        prop_assert_eq!(actual, requested.max(MIN_PULSE_WIDTH_US).min(MAX_PULSE_WIDTH_US));
        prop_assert_eq!(daemon.writes_to(12), vec![actual.unsigned_abs()]);
    }

    #[test]
    fn prop_in_range_is_identity(requested in MIN_PULSE_WIDTH_US..=MAX_PULSE_WIDTH_US) {
        prop_assert_eq!(clamp_pulse_width(requested), requested);
    }

    #[test]
    fn prop_restore_always_writes_clamped_default(default in any::<i32>(), commands in prop::collection::vec(any::<i32>(), 0..16)) {
        let daemon = MockGpioDaemon::new();
        let driver = PwmDriver::new(PortId::new(12), "servo", default, daemon.clone());
        for c in &commands {
            driver.set_pulse(*c);
        }
        daemon.clear_calls();

        prop_assert_eq!(driver.restore(), Ok(clamp_pulse_width(default)));
        prop_assert_eq!(daemon.writes_to(12), vec![clamp_pulse_width(default).unsigned_abs()]);
    }
}
