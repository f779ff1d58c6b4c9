//! The MRM transition-group peak picker (C5): turns a group of correlated
//! fragment-ion chromatograms into quantified features (spec.md §4.1).

pub mod border;
pub mod error;
pub mod integration;
pub mod picker;
pub mod quality;
pub mod traits;
pub mod types;

/// A subset of the types most commonly needed when working with this crate.
pub mod prelude {
    pub use crate::border::recalculate_borders;
    pub use crate::error::MrmError;
    pub use crate::integration::{apex_within, convex_hull_within, trapezoid_area, TrapezoidIntegrator};
    pub use crate::picker::TransitionGroupPicker;
    pub use crate::quality::{resample, score_feature, QualityScore};
    pub use crate::traits::{IdentitySmoother, Integrator, PeakPicker, Smoother};
    pub use crate::types::{BaselineMode, PickedPeak, PickerParams, ResampleSource, SeedPolicy};
}
