//! The SVM training harness (C3): an oligo kernel over biosequences, a
//! libsvm-shaped precomputed kernel matrix, a pluggable training/prediction
//! backend, grid-search cross-validation, and significance borders.

pub mod error;
pub mod grid;
pub mod kernel;
pub mod matrix;
pub mod problem;
pub mod significance;

/// A subset of the types most commonly needed when working with this crate.
pub mod prelude {
    pub use crate::error::SvmError;
    pub use crate::grid::{cross_validate, next_grid, GridDimension, GridParam, GridSearchResult, ParamGrid};
    pub use crate::kernel::{OligoKernel, Residue};
    pub use crate::matrix::KernelMatrix;
    pub use crate::problem::{
        predict, svc_probabilities, train, KernelAveragingBackend, KernelKind, SvmBackend, SvmKind,
        SvmModel, SvmParameters, SvmProblem,
    };
    pub use crate::significance::SignificanceBorders;
}
