//! Entity shapes for the Identification Data Store (spec.md §3/§4.4).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::Id;

/// A free-form meta value, supplementing the typed score maps (see
/// SPEC_FULL.md, supplemented feature 1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    /// An integer meta value.
    Int(i64),
    /// A floating point meta value.
    Float(f64),
    /// A string meta value.
    String(String),
}

/// One input file an observation or processing step was derived from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputFile {
    /// File path or name, as recorded by the acquisition/search pipeline.
    pub name: String,
    /// Free-form experimental label (e.g. "fraction 3").
    pub experimental_design: Option<String>,
}

/// The software that produced a processing step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessingSoftware {
    /// Tool name, e.g. `"Comet"`.
    pub name: String,
    /// Tool version string.
    pub version: String,
}

/// Search engine parameters attached to a processing step.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DbSearchParam {
    /// Opaque key/value parameter bag (enzyme, tolerances, …).
    pub settings: HashMap<String, String>,
}

/// A named, oriented score axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreType {
    /// Score name, e.g. `"q-value"`.
    pub name: String,
    /// `true` iff a larger value is a better match.
    pub higher_better: bool,
}

/// One step of a processing pipeline: the software that ran, the input
/// files it consumed, and (optionally) the search parameters used.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessingStep {
    /// The software that performed this step.
    pub software: Id<ProcessingSoftware>,
    /// Input files consumed by this step.
    pub input_files: Vec<Id<InputFile>>,
    /// Search parameters used, if applicable.
    pub search_param: Option<Id<DbSearchParam>>,
}

/// Scores accumulated at one processing step, keyed by score type.
pub type ScoreMap = HashMap<Id<ScoreType>, f64>;

/// The ordered (processing step, scores) history every entity but
/// [`Observation`] carries.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppliedProcessingSteps {
    /// One entry per processing step this entity passed through, in order.
    pub steps: Vec<(Id<ProcessingStep>, ScoreMap)>,
}

impl AppliedProcessingSteps {
    /// The most recently applied processing step, if any.
    pub fn current(&self) -> Option<Id<ProcessingStep>> {
        self.steps.last().map(|(step, _)| *step)
    }

    /// `true` iff `step` is already the most recently applied step.
    pub fn already_current(&self, step: Id<ProcessingStep>) -> bool {
        self.current() == Some(step)
    }
}

/// A spectrum or feature reference: a single measured entity an
/// identification can be attached to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Observation {
    /// Native id within `input_file` (e.g. the scan's native id).
    pub data_id: String,
    /// The input file this observation comes from.
    pub input_file: Id<InputFile>,
    /// Supplemented free-form meta values.
    pub meta: HashMap<String, MetaValue>,
}

/// Which kind of biological sequence a [`ParentSequence`] represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoleculeType {
    /// A protein sequence.
    Protein,
    /// A nucleic-acid sequence (RNA or DNA).
    NucleicAcid,
}

/// A protein or nucleic-acid reference sequence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParentSequence {
    /// Database accession.
    pub accession: String,
    /// Protein vs nucleic acid.
    pub molecule_type: MoleculeType,
    /// The sequence text itself.
    pub sequence: String,
    /// Fraction of the sequence covered by valid matches, in `[0, 1]`.
    pub coverage: f64,
    /// `true` iff this is a decoy entry.
    pub decoy: bool,
    /// Ordered processing-step history.
    pub applied_processing_steps: AppliedProcessingSteps,
}

/// A half-open `[start, end]` match of an identified molecule onto a
/// [`ParentSequence`] (inclusive 0-based positions).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentMatch {
    /// The parent sequence matched against.
    pub parent: Id<ParentSequence>,
    /// Inclusive start position.
    pub start: usize,
    /// Inclusive end position.
    pub end: usize,
}

/// What kind of molecule an [`ObservationMatch`] identifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoleculeRef {
    /// An identified peptide.
    Peptide(Id<IdentifiedMolecule>),
    /// An identified small-molecule compound.
    Compound(Id<IdentifiedMolecule>),
    /// An identified oligonucleotide.
    Oligo(Id<IdentifiedMolecule>),
}

/// An identified peptide, compound, or oligonucleotide (the three share a
/// shape: a sequence-ish identity plus parent matches).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentifiedMolecule {
    /// Canonical string representation (peptide sequence, compound name, …).
    pub identity: String,
    /// Parent-sequence matches.
    pub parent_matches: Vec<ParentMatch>,
    /// Ordered processing-step history.
    pub applied_processing_steps: AppliedProcessingSteps,
    /// Supplemented free-form meta values.
    pub meta: HashMap<String, MetaValue>,
}

/// A chemical adduct (e.g. `[M+Na]+`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Adduct {
    /// Human-readable adduct name.
    pub name: String,
    /// Net charge contributed.
    pub charge: i16,
}

/// One annotated peak, linking an observation's peak index to a molecule
/// fragment (out of scope to type the fragment further here).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PeakAnnotation {
    /// Index into the observation's peak list.
    pub peak_index: usize,
    /// Mass error in ppm, if computed.
    pub mass_error_ppm: Option<f64>,
}

/// The central edge of the store: one identified molecule observed once,
/// with its charge state, optional adduct, peak annotations, and scores.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObservationMatch {
    /// The identified molecule.
    pub molecule: MoleculeRef,
    /// The observation it was matched against.
    pub observation: Id<Observation>,
    /// Observed charge state.
    pub charge: i16,
    /// Adduct, if any (mainly for compounds/oligos).
    pub adduct: Option<Id<Adduct>>,
    /// Annotated fragment peaks.
    pub peak_annotations: Vec<PeakAnnotation>,
    /// Ordered processing-step history.
    pub applied_processing_steps: AppliedProcessingSteps,
    /// Supplemented free-form meta values.
    pub meta: HashMap<String, MetaValue>,
}

/// A group of parent sequences sharing indistinguishable evidence (a
/// "protein group").
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParentSequenceGroup {
    /// Member parent sequences.
    pub members: Vec<Id<ParentSequence>>,
    /// Group-level scores.
    pub applied_processing_steps: AppliedProcessingSteps,
}

/// A group of observation matches treated as one quantitative/statistical
/// unit (e.g. all charge states of one PSM).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ObservationMatchGroup {
    /// Member observation matches.
    pub members: Vec<Id<ObservationMatch>>,
    /// Group-level scores.
    pub applied_processing_steps: AppliedProcessingSteps,
}
