//! Pulse width decoder for RC receiver inputs
//!
//! Each input port gets one [`PulseDecoder`]. It turns the rising and falling
//! edges observed on the line into pulse width readings: a rising edge arms
//! the decoder, the next falling edge emits `falling - rising` in
//! microseconds.
//!
//! Ticks are 32-bit microsecond counters that wrap, so widths are computed
//! with wrapping subtraction. Decoded widths are reported as observed, with
//! no clamping.
//!
//! A falling edge seen before any rising edge is reported as
//! [`DecodeError::UnmatchedEdge`](rcio_errors::DecodeError::UnmatchedEdge)
//! and produces no reading.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod decoder;
pub mod edge;

pub use decoder::{DecoderStats, PulseDecoder, PulseReading};
pub use edge::{Edge, EdgeEvent, Tick};
