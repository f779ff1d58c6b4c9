//! The multiplex feature finder (C6): detects isotopically labeled peptide
//! multiplets (SILAC, dimethyl, ICPL, ...) in an LC-MS experiment
//! (spec.md §4.2).

pub mod cluster;
pub mod error;
pub mod feature;
pub mod filter;
pub mod intensity;
pub mod pattern;
pub mod satellite;

/// A subset of the types most commonly needed when working with this crate.
pub mod prelude {
    pub use crate::cluster::{cluster_points, Cluster};
    pub use crate::error::MultiplexError;
    pub use crate::feature::{synthesize_cluster_feature, ClusterFeature, ConsensusFeature, Feature, FeatureHandle};
    pub use crate::filter::{CentroidedFilter, PatternFilter, ProfileFilter};
    pub use crate::intensity::{correct_peptide_intensities, peptide_rt_and_intensity, CorrectedIntensities};
    pub use crate::pattern::{generate_peak_patterns, LabelSet, MultiplexDeltaMassesGenerator, PeakPattern};
    pub use crate::satellite::{dedup_satellites, Satellite, SatelliteOrigin, SeedMatch};
}
