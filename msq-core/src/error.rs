//! Error taxonomy shared across the msq workspace.
//!
//! `EndParsingSoftly` from the abstract error design is deliberately absent
//! here: it is a control-flow signal used only inside file-format loaders
//! (out of scope for this workspace) and must never surface past that
//! boundary.

use thiserror::Error;

/// Errors raised by the parameter registry, data model, and chemistry
/// primitives in [`crate`].
#[derive(Debug, Error)]
pub enum CoreError {
    /// A key was not present in a parameter tree or look-up map.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// A value violated a restriction (min/max, whitelist) attached to a
    /// parameter entry.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Dotted path of the offending entry.
        name: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A value was structurally invalid independent of any restriction
    /// (e.g. a node name containing `:`, a tag containing `,`).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A required piece of information was not supplied.
    #[error("missing information: {0}")]
    MissingInformation(String),

    /// A reference did not resolve against an existence table, or an enum
    /// literal was unrecognized, or state was otherwise inconsistent.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// A malformed section was encountered while parsing.
    #[error("parse error: {0}")]
    ParseError(String),

    /// A file could not be created or written.
    #[error("unable to create file `{0}`")]
    UnableToCreateFile(String),

    /// A file that should contain data was empty.
    #[error("file is empty: {0}")]
    FileEmpty(String),
}

/// Convenience alias used throughout `msq-core`.
pub type Result<T> = std::result::Result<T, CoreError>;
