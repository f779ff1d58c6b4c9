//! Errors raised by the Identification Data Store (spec.md §7).

use thiserror::Error;

/// Error kinds raised by [`crate::store::IdentificationStore`].
#[derive(Debug, Error, PartialEq)]
pub enum IdentError {
    /// A referenced entity does not exist in this store's look-up tables.
    #[error("reference to unknown {kind} id")]
    IllegalArgument {
        /// The entity kind the dangling reference pointed at.
        kind: &'static str,
    },
    /// A score type was registered with a `higher_better` orientation that
    /// conflicts with an already-registered score type of the same name.
    #[error("score type `{name}` already registered with a different orientation")]
    ConflictingScoreOrientation {
        /// The conflicting score type name.
        name: String,
    },
    /// A value fell outside its required domain.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// A required cross-reference was not supplied.
    #[error("missing information: {0}")]
    MissingInformation(String),
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, IdentError>;
