//! Shared test utilities for rcio.
//!
//! # Modules
//!
//! - [`mock`] - In-memory GPIO daemon and connector
//! - [`bus`] - Bus recorders and a bus with injectable failures
//! - [`fixtures`] - Ready-made port registries
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! rcio-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use rcio_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod bus;
pub mod fixtures;
pub mod mock;
pub mod prelude;
