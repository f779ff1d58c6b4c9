//! The normalized, reference-checked identification/quantification data
//! store (C2). Holds the DAG of input files, processing steps, observations,
//! parent sequences, identified molecules, and the observation matches that
//! connect them.

pub mod entities;
pub mod error;
pub mod id;
pub mod store;

/// A subset of the types most commonly needed when working with this crate.
pub mod prelude {
    pub use crate::entities::{
        Adduct, AppliedProcessingSteps, DbSearchParam, IdentifiedMolecule, InputFile,
        MoleculeRef, MoleculeType, Observation, ObservationMatch, ObservationMatchGroup,
        ParentMatch, ParentSequence, ParentSequenceGroup, ProcessingSoftware, ProcessingStep,
        ScoreType,
    };
    pub use crate::error::IdentError;
    pub use crate::id::Id;
    pub use crate::store::{CleanupFlags, IdentificationStore, RefTranslator};
}
