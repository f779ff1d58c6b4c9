//! Errors raised by the multiplex feature finder (spec.md §7).

use thiserror::Error;

/// Error kinds raised by this crate.
#[derive(Debug, Error, PartialEq)]
pub enum MultiplexError {
    /// A charge range, isotope count, or similar configuration value was
    /// out of range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// A required input (e.g. an empty label-set list) was missing.
    #[error("missing information: {0}")]
    MissingInformation(String),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, MultiplexError>;
