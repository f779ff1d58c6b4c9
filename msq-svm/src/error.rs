//! Errors raised by the SVM harness (spec.md §7).

use thiserror::Error;

/// Error kinds raised by this crate.
#[derive(Debug, Error, PartialEq)]
pub enum SvmError {
    /// A parameter value was outside its accepted domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the value is rejected.
        reason: String,
    },
    /// A grid-search dimension is missing a step size (or other required
    /// cross-reference).
    #[error("missing information: {0}")]
    MissingInformation(String),
    /// An enum literal or kernel/svm-type tag was not recognized.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, SvmError>;
