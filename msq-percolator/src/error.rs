//! Errors raised by the Percolator integration pipeline (spec.md §7).

use thiserror::Error;

/// Error kinds raised by this crate.
#[derive(Debug, Error, PartialEq)]
pub enum PercolatorError {
    /// A PSM/protein record was malformed, or a pout file couldn't be
    /// parsed.
    #[error("parse error: {0}")]
    ParseError(String),
    /// An input set failed a precondition (e.g. no decoys found, mismatched
    /// search engines across runs).
    #[error("illegal argument: {0}")]
    IllegalArgument(String),
    /// A required value (e.g. a PIN column, a score type) was missing.
    #[error("missing information: {0}")]
    MissingInformation(String),
    /// The Percolator subprocess exited with a non-zero status.
    #[error("external program error (exit code {exit_code}): {stderr}")]
    ExternalProgramError { exit_code: i32, stderr: String },
    /// Spawning or communicating with the subprocess failed at the OS level.
    #[error("i/o error invoking percolator: {0}")]
    Io(String),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, PercolatorError>;
