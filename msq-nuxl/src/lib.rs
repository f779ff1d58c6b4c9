//! NuXL fragment-adduct feasibility (C4): from a precursor adduct string and
//! a per-nucleotide fragment-adduct dictionary, derive the full set of
//! feasible MS2 fragment adducts and marker ions.

pub mod error;
pub mod fragment_adduct;
pub mod modification;

/// A subset of the types most commonly needed when working with this crate.
pub mod prelude {
    pub use crate::error::NuxlError;
    pub use crate::fragment_adduct::{
        feasible_adducts, FragmentAdduct, FragmentAdductCandidate, FragmentAdductTable,
        NucleicAcidAlphabet, NuxlResult,
    };
    pub use crate::modification::ModificationRegistry;
}
