//! Error types for multimouse-core.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Event source failure (open or read).
    #[error("source error: {0}")]
    Source(String),

    /// No event sources could be bound at startup.
    #[error("no event sources bound; refusing to start")]
    NoSources,

    /// Value out of allowed range.
    #[error("value out of range: {field} = {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Malformed telemetry frame (decoder side).
    #[error("frame error: {0}")]
    Frame(String),

    /// Output sink write failure.
    #[error("sink error: {0}")]
    Sink(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
