//! Errors raised by the NuXL fragment-adduct engine (spec.md §7).

use thiserror::Error;

/// Error kinds raised by this crate.
#[derive(Debug, Error, PartialEq)]
pub enum NuxlError {
    /// The precursor adduct string could not be parsed.
    #[error("could not parse precursor adduct string `{0}`")]
    ParseError(String),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, NuxlError>;
