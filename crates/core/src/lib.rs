//! multimouse-core: slot aggregation, frame codecs, and settings validation.
//!
//! This crate provides the host-side core logic for feeding up to six mice
//! to a microcontroller over a serial link: per-slot motion accumulation, the
//! 15-byte telemetry frame, the 11-byte configuration control frame, and a
//! synthetic source for testing without real devices. Device discovery and
//! the serial transport live in the CLI crate behind the [`aggregator::EventMux`]
//! and [`transport::FrameSink`] traits.

pub mod aggregator;
pub mod control;
pub mod error;
pub mod frame;
pub mod settings;
pub mod slots;
pub mod synthetic;
pub mod transport;
pub mod validate;

pub use frame::NUM_SLOTS;
