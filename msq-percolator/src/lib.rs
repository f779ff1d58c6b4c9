//! The Percolator integration pipeline (C7): builds PIN feature matrices,
//! invokes the Percolator subprocess, and reintegrates q-values, PEPs, and
//! SVM scores back into identifications (spec.md §4.6).

pub mod config;
pub mod error;
pub mod pin;
pub mod pout;
pub mod reintegrate;

/// A subset of the types most commonly needed when working with this crate.
pub mod prelude {
    pub use crate::config::{invoke_percolator, PercolatorConfig, ScoreType};
    pub use crate::error::PercolatorError;
    pub use crate::pin::{PinBuilder, Psm};
    pub use crate::pout::{parse_protein_pout, parse_psm_pout, PoutRecord, ProteinPoutRecord};
    pub use crate::reintegrate::{
        rebuild_protein_groups, reintegrate_psms, ProteinGroup, ReintegratedPsm, MISSED_Q_AND_PEP, MISSED_SVM_SCORE,
    };
}
