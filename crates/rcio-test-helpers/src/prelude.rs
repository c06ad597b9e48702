//! Convenience re-exports for common test utilities.

pub use crate::bus::{BusRecorder, FaultyBus};
pub use crate::fixtures::{mixed_registry, single_output_registry};
pub use crate::mock::{DaemonCall, MockConnector, MockGpioDaemon};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
