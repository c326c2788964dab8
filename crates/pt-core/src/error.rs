//! Core error type.
//!
//! Sub-crates define their own error enums and convert from this one via
//! `From` where a boundary needs it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cadence must be at least one millisecond")]
    ZeroCadence,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `pt-core`.
pub type CoreResult<T> = Result<T, CoreError>;
