//! Chromatograms and MRM transition groups. See spec.md §3.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::quantity::{MassOverCharge, RetentionTime};

/// One (retention time, intensity) sample of a chromatogram.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChromatogramPoint {
    /// Retention time of this sample.
    pub rt: RetentionTime,
    /// Intensity at this retention time.
    pub intensity: f32,
}

/// An ordered sequence of (RT, intensity) points for one product m/z.
///
/// Invariant: `points` is strictly increasing in `rt`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Chromatogram {
    /// Native identifier, unique within its transition group.
    pub native_id: String,
    /// The product (fragment) m/z this chromatogram traces, or the
    /// precursor m/z for a precursor chromatogram.
    pub product_mz: MassOverCharge,
    /// Precursor m/z this chromatogram's transition belongs to.
    pub precursor_mz: MassOverCharge,
    /// The RT/intensity samples.
    pub points: Vec<ChromatogramPoint>,
}

impl Chromatogram {
    /// `true` iff `points` is strictly increasing in retention time.
    #[must_use]
    pub fn has_strictly_increasing_rt(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].rt.value() < w[1].rt.value())
    }
}

/// Whether a transition contributes to peak picking/quantification
/// (`Detecting`) or is used only for confirmation (`Identifying`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionRole {
    /// Contributes to picking and quantification.
    Detecting,
    /// Used only for confirmation; excluded from picking.
    Identifying,
}

/// One (precursor m/z, product m/z) pair, keyed by the native id of its
/// chromatogram.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transition {
    /// Native id, matching a [`Chromatogram::native_id`] in the owning group.
    pub native_id: String,
    /// Detecting vs identifying role.
    pub role: TransitionRole,
}

/// The bounding box of one chromatogram's points within a feature's window
/// (spec.md §4.1.4 "convex hulls = per-trace bounding boxes").
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConvexHull {
    pub rt_min: f64,
    pub rt_max: f64,
    pub intensity_min: f64,
    pub intensity_max: f64,
}

/// A single quantified MRM feature: one picked peak across the whole
/// transition group, with per-transition peak areas. Built by the picker in
/// `msq-mrm`; stored here so a [`MrmTransitionGroup`] is self-contained.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MrmFeature {
    /// Retention time of the picked apex.
    pub rt: RetentionTime,
    /// The product m/z of the chromatogram the seed peak came from.
    pub mz: MassOverCharge,
    /// Integrated area per chromatogram, keyed by native id.
    pub areas: HashMap<String, f64>,
    /// Overall quality score assigned by the picker (higher is better).
    pub quality: f64,
    /// Left edge of the feature's consensus window.
    pub left_width: f64,
    /// Right edge of the feature's consensus window.
    pub right_width: f64,
    /// Sum of every detecting chromatogram's raw intensity across the whole
    /// transition group (constant across all features of the same group).
    pub total_xic: f64,
    /// Sum of the per-chromatogram apex intensities within this feature's
    /// window.
    pub peak_apices_sum: f64,
    /// Per-chromatogram bounding box within the feature's window, keyed by
    /// native id.
    pub convex_hulls: HashMap<String, ConvexHull>,
}

/// A correlated set of chromatograms sharing one peptide precursor.
///
/// Invariants (spec.md §3):
/// * `chromatogramIdsMatch`: every chromatogram's native id is a key in
///   `transitions`.
/// * "internally consistent": every transition has a matching chromatogram.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MrmTransitionGroup {
    /// The peptide/compound reference this group was built for.
    pub group_id: String,
    /// Fragment-ion chromatograms, keyed by native id.
    pub chromatograms: HashMap<String, Chromatogram>,
    /// Optional precursor-ion chromatograms, keyed by native id.
    pub precursor_chromatograms: HashMap<String, Chromatogram>,
    /// Per-chromatogram transition role, keyed by native id.
    pub transitions: HashMap<String, Transition>,
    /// MRM features accumulated by the peak picker.
    pub features: Vec<MrmFeature>,
}

impl MrmTransitionGroup {
    /// `true` iff every chromatogram's native id is a key in `transitions`.
    #[must_use]
    pub fn chromatogram_ids_match(&self) -> bool {
        self.chromatograms
            .keys()
            .all(|id| self.transitions.contains_key(id))
    }

    /// `true` iff every transition has a matching chromatogram.
    #[must_use]
    pub fn is_internally_consistent(&self) -> bool {
        self.transitions
            .keys()
            .all(|id| self.chromatograms.contains_key(id))
    }

    /// Iterate over the detecting fragment-ion chromatograms.
    pub fn detecting_chromatograms(&self) -> impl Iterator<Item = &Chromatogram> {
        self.chromatograms.values().filter(move |c| {
            self.transitions
                .get(&c.native_id)
                .is_some_and(|t| t.role == TransitionRole::Detecting)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrom(id: &str) -> Chromatogram {
        Chromatogram {
            native_id: id.to_string(),
            ..Chromatogram::default()
        }
    }

    #[test]
    fn strictly_increasing_rt_invariant() {
        let c = Chromatogram {
            points: vec![
                ChromatogramPoint {
                    rt: RetentionTime(10.0),
                    intensity: 1.0,
                },
                ChromatogramPoint {
                    rt: RetentionTime(20.0),
                    intensity: 2.0,
                },
            ],
            ..Chromatogram::default()
        };
        assert!(c.has_strictly_increasing_rt());
        let bad = Chromatogram {
            points: vec![
                ChromatogramPoint {
                    rt: RetentionTime(20.0),
                    intensity: 1.0,
                },
                ChromatogramPoint {
                    rt: RetentionTime(10.0),
                    intensity: 2.0,
                },
            ],
            ..Chromatogram::default()
        };
        assert!(!bad.has_strictly_increasing_rt());
    }

    #[test]
    fn consistency_invariants() {
        let mut group = MrmTransitionGroup::default();
        group.chromatograms.insert("t1".into(), chrom("t1"));
        group.transitions.insert(
            "t1".into(),
            Transition {
                native_id: "t1".into(),
                role: TransitionRole::Detecting,
            },
        );
        assert!(group.chromatogram_ids_match());
        assert!(group.is_internally_consistent());

        group.chromatograms.insert("orphan".into(), chrom("orphan"));
        assert!(!group.chromatogram_ids_match());

        group.transitions.insert(
            "missing".into(),
            Transition {
                native_id: "missing".into(),
                role: TransitionRole::Identifying,
            },
        );
        assert!(!group.is_internally_consistent());
    }
}
