//! Errors raised by the MRM transition-group peak picker (spec.md §7).

use thiserror::Error;

/// Error kinds raised by this crate.
#[derive(Debug, Error, PartialEq)]
pub enum MrmError {
    /// An unrecognized `peak_integration` literal, or a missing smoothed
    /// chromatogram when one was required.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
    /// The group failed its `chromatogramIdsMatch`/internal-consistency
    /// precondition.
    #[error("transition group is not internally consistent: {0}")]
    InconsistentGroup(String),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, MrmError>;
