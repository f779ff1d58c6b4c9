//! The transition-group peak picker (spec.md §4.1): seed selection, feature
//! construction (consensus and non-consensus), border recalculation, quality
//! scoring, and integration, tied together into `pick_transition_group`.

use std::collections::HashMap;

use msq_core::chromatogram::{Chromatogram, MrmFeature, MrmTransitionGroup};
use msq_core::quantity::{MassOverCharge, RetentionTime};

use crate::border::recalculate_borders;
use crate::error::{MrmError, Result};
use crate::integration::{apex_within, convex_hull_within};
use crate::quality::{resample, score_feature};
use crate::traits::{Integrator, PeakPicker, Smoother};
use crate::types::{PickedPeak, PickerParams, ResampleSource, SeedPolicy};

const QUALITY_RESAMPLE_POINTS: usize = 25;
const QUALITY_MAX_LAG: i32 = 2;

/// Orchestrates peak picking for one [`MrmTransitionGroup`].
pub struct TransitionGroupPicker<'a> {
    pub peak_picker: &'a dyn PeakPicker,
    pub smoother: &'a dyn Smoother,
    pub integrator: &'a dyn Integrator,
    pub params: PickerParams,
}

struct WorkingTrace {
    native_id: String,
    original: Chromatogram,
    smoothed: Chromatogram,
    peaks: Vec<PickedPeak>,
}

impl WorkingTrace {
    /// The chromatogram variant selected by `source` for resampling.
    fn active(&self, source: ResampleSource) -> &Chromatogram {
        match source {
            ResampleSource::Original => &self.original,
            ResampleSource::Smoothed => &self.smoothed,
        }
    }
}

impl<'a> TransitionGroupPicker<'a> {
    /// Picks every feature in `group`, appending them to `group.features` in
    /// discovery order. Fails fast if `group` is not internally consistent.
    pub fn pick_transition_group(&self, group: &mut MrmTransitionGroup) -> Result<()> {
        if !group.chromatogram_ids_match() || !group.is_internally_consistent() {
            return Err(MrmError::InconsistentGroup(group.group_id.clone()));
        }

        let mut traces: Vec<WorkingTrace> = group
            .detecting_chromatograms()
            .map(|chrom| {
                let smoothed = self.smoother.smooth(chrom);
                let peaks = self.peak_picker.pick(&smoothed);
                WorkingTrace { native_id: chrom.native_id.clone(), original: chrom.clone(), smoothed, peaks }
            })
            .collect();

        let total_xic: f64 = traces
            .iter()
            .flat_map(|t| t.original.points.iter())
            .map(|p| f64::from(p.intensity))
            .sum();

        let mut kept: Vec<MrmFeature> = Vec::new();
        loop {
            let Some((trace_idx, peak_idx)) = select_seed(&traces, self.params.seed_policy) else {
                break;
            };
            let seed = traces[trace_idx].peaks[peak_idx];
            let seed_mz = traces[trace_idx].original.product_mz;
            let window = if self.params.consensus {
                consensus_window(&traces, trace_idx, (seed.left, seed.right), self.params.max_z, self.params.border_recalculation)
            } else {
                (seed.left, seed.right)
            };

            let feature = self.build_feature(&traces, window, seed_mz, total_xic);

            // Consume every peak overlapping the final window so seed
            // selection makes forward progress regardless of whether this
            // window becomes a kept feature.
            zero_overlapping_peaks(&mut traces, window);

            let Some(feature) = feature else { continue };

            if window.1 - window.0 < self.params.min_peak_width {
                continue;
            }
            if self.params.quality_scoring && feature.quality < self.params.min_qual {
                continue;
            }

            let intensity = feature_intensity(&feature);
            if intensity <= 0.0 {
                continue;
            }

            // Deduplication (spec.md §4.1 step 3): discard a feature whose
            // window falls entirely inside one already kept.
            if contained_in_any(window, &kept) {
                continue;
            }

            let stop_on_ratio = self
                .params
                .stop_after_intensity_ratio
                .is_some_and(|ratio| total_xic > 0.0 && intensity / total_xic < ratio);

            kept.push(feature);

            if stop_on_ratio {
                break;
            }
            if self.params.stop_after_feature.is_some_and(|n| kept.len() >= n) {
                break;
            }
        }

        group.features.extend(kept);
        Ok(())
    }

    fn build_feature(&self, traces: &[WorkingTrace], window: (f64, f64), mz: MassOverCharge, total_xic: f64) -> Option<MrmFeature> {
        if window.1 <= window.0 {
            return None;
        }
        let mut areas = HashMap::new();
        let mut convex_hulls = HashMap::new();
        let mut profiles = Vec::new();
        let mut apex_rt = None;
        let mut apex_intensity = f64::NEG_INFINITY;
        let mut peak_apices_sum = 0.0;

        for trace in traces {
            let chrom = trace.active(self.params.peak_integration);
            let area = self.integrator.integrate(chrom, window.0, window.1);
            areas.insert(trace.native_id.clone(), area);
            profiles.push(resample(chrom, window.0, window.1, QUALITY_RESAMPLE_POINTS));
            if let Some(hull) = convex_hull_within(chrom, window.0, window.1) {
                convex_hulls.insert(trace.native_id.clone(), hull);
            }
            if let Some((rt, intensity)) = apex_within(chrom, window.0, window.1) {
                peak_apices_sum += intensity;
                if intensity > apex_intensity {
                    apex_intensity = intensity;
                    apex_rt = Some(rt);
                }
            }
        }

        let quality = if self.params.quality_scoring {
            score_feature(&profiles, QUALITY_MAX_LAG).score
        } else {
            0.0
        };

        Some(MrmFeature {
            rt: RetentionTime(apex_rt.unwrap_or(0.5 * (window.0 + window.1))),
            mz,
            areas,
            quality,
            left_width: window.0,
            right_width: window.1,
            total_xic,
            peak_apices_sum,
            convex_hulls,
        })
    }
}

/// `true` iff `window` falls entirely inside some already-kept feature's
/// `[left_width, right_width]` interval (spec.md §4.1 step 3).
fn contained_in_any(window: (f64, f64), kept: &[MrmFeature]) -> bool {
    kept.iter().any(|f| window.0 >= f.left_width && window.1 <= f.right_width)
}

fn feature_intensity(feature: &MrmFeature) -> f64 {
    feature.areas.values().sum()
}

/// Picks the next seed across all traces by `policy`, ignoring zeroed-out
/// (already consumed) peaks.
fn select_seed(traces: &[WorkingTrace], policy: SeedPolicy) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (ti, trace) in traces.iter().enumerate() {
        for (pi, peak) in trace.peaks.iter().enumerate() {
            if peak.intensity <= 0.0 {
                continue;
            }
            let key = match policy {
                SeedPolicy::Largest => peak.intensity,
                SeedPolicy::Widest => peak.width(),
            };
            let is_better = best.map_or(true, |(_, _, best_key)| key > best_key);
            if is_better {
                best = Some((ti, pi, key));
            }
        }
    }
    best.map(|(ti, pi, _)| (ti, pi))
}

/// Consensus border (spec.md §4.1.2): the window formed by the seed's own
/// boundary and every peer trace's peak overlapping it, optionally
/// recalculated by replacing an outlying seed edge with the population
/// median.
fn consensus_window(
    traces: &[WorkingTrace],
    seed_trace_idx: usize,
    seed_window: (f64, f64),
    max_z: f64,
    recalc: bool,
) -> (f64, f64) {
    let peers: Vec<(f64, f64)> = traces
        .iter()
        .enumerate()
        .filter(|(ti, _)| *ti != seed_trace_idx)
        .flat_map(|(_, t)| t.peaks.iter())
        .filter(|p| p.intensity > 0.0 && p.overlaps(seed_window))
        .map(|p| (p.left, p.right))
        .collect();
    if peers.is_empty() {
        return seed_window;
    }
    if recalc {
        recalculate_borders(seed_window, &peers, max_z)
    } else {
        let left = std::iter::once(seed_window.0).chain(peers.iter().map(|b| b.0)).fold(f64::INFINITY, f64::min);
        let right = std::iter::once(seed_window.1).chain(peers.iter().map(|b| b.1)).fold(f64::NEG_INFINITY, f64::max);
        (left, right)
    }
}

/// Zeroes the intensity of every picked peak (in every trace) whose interval
/// overlaps `window`, so it is never selected as a future seed.
fn zero_overlapping_peaks(traces: &mut [WorkingTrace], window: (f64, f64)) {
    for trace in traces {
        for peak in &mut trace.peaks {
            if peak.overlaps(window) {
                peak.intensity = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msq_core::chromatogram::{ChromatogramPoint, Transition, TransitionRole};
    use crate::integration::TrapezoidIntegrator;
    use crate::traits::IdentitySmoother;
    use crate::types::BaselineMode;

    struct FixedPicker(HashMap<String, Vec<PickedPeak>>);

    impl PeakPicker for FixedPicker {
        fn pick(&self, chromatogram: &Chromatogram) -> Vec<PickedPeak> {
            self.0.get(&chromatogram.native_id).cloned().unwrap_or_default()
        }
    }

    fn point(rt: f64, intensity: f32) -> ChromatogramPoint {
        ChromatogramPoint { rt: RetentionTime(rt), intensity }
    }

    fn detecting(id: &str) -> Transition {
        Transition { native_id: id.to_string(), role: TransitionRole::Detecting }
    }

    /// Spec.md §8 scenario S1: a chromatogram with peaks at RT = 10, 20, 30 s
    /// (intensities 100, 50, 10), picked boundaries 8-12, 18-22, 28-32,
    /// yields three features with trapezoidal areas matching the raw data.
    #[test]
    fn s1_single_trace_three_peaks_yield_three_trapezoidal_features() {
        let chrom = Chromatogram {
            native_id: "t1".into(),
            points: vec![
                point(8.0, 0.0), point(10.0, 100.0), point(12.0, 0.0),
                point(18.0, 0.0), point(20.0, 50.0), point(22.0, 0.0),
                point(28.0, 0.0), point(30.0, 10.0), point(32.0, 0.0),
            ],
            ..Chromatogram::default()
        };
        let mut group = MrmTransitionGroup::default();
        group.group_id = "g1".into();
        group.transitions.insert("t1".into(), detecting("t1"));
        group.chromatograms.insert("t1".into(), chrom);

        let peaks = HashMap::from([(
            "t1".to_string(),
            vec![
                PickedPeak { apex_rt: 10.0, left: 8.0, right: 12.0, intensity: 100.0 },
                PickedPeak { apex_rt: 20.0, left: 18.0, right: 22.0, intensity: 50.0 },
                PickedPeak { apex_rt: 30.0, left: 28.0, right: 32.0, intensity: 10.0 },
            ],
        )]);
        let picker = FixedPicker(peaks);
        let smoother = IdentitySmoother;
        let integrator = TrapezoidIntegrator { mode: BaselineMode::Original };
        let group_picker = TransitionGroupPicker {
            peak_picker: &picker,
            smoother: &smoother,
            integrator: &integrator,
            params: PickerParams::default(),
        };

        group_picker.pick_transition_group(&mut group).unwrap();
        assert_eq!(group.features.len(), 3);
        let mut areas: Vec<f64> = group.features.iter().map(|f| f.areas["t1"]).collect();
        areas.sort_by(f64::total_cmp);
        assert!((areas[0] - 20.0).abs() < 1e-6, "areas={areas:?}");
        assert!((areas[1] - 100.0).abs() < 1e-6, "areas={areas:?}");
        assert!((areas[2] - 200.0).abs() < 1e-6, "areas={areas:?}");

        for f in &group.features {
            assert_eq!(f.mz, MassOverCharge(0.0));
            assert!((f.total_xic - 160.0).abs() < 1e-6);
            assert!(f.peak_apices_sum > 0.0);
            assert!(f.convex_hulls.contains_key("t1"));
            assert!(f.right_width > f.left_width);
        }
    }

    /// Spec.md §8 scenario S2: two overlapping traces; consensus mode zeroes
    /// the peer trace's peak on the first iteration, so the second
    /// iteration's seed search finds nothing.
    #[test]
    fn s2_consensus_mode_zeroes_the_peer_trace_on_first_pass() {
        let mut group = MrmTransitionGroup::default();
        group.group_id = "g2".into();
        for id in ["t1", "t2"] {
            group.transitions.insert(id.into(), detecting(id));
            group.chromatograms.insert(
                id.into(),
                Chromatogram {
                    native_id: id.into(),
                    points: vec![point(8.0, 0.0), point(10.0, 100.0), point(12.0, 0.0)],
                    ..Chromatogram::default()
                },
            );
        }

        let peaks = HashMap::from([
            ("t1".to_string(), vec![PickedPeak { apex_rt: 10.0, left: 8.0, right: 12.0, intensity: 100.0 }]),
            ("t2".to_string(), vec![PickedPeak { apex_rt: 10.0, left: 9.0, right: 11.0, intensity: 80.0 }]),
        ]);
        let picker = FixedPicker(peaks);
        let smoother = IdentitySmoother;
        let integrator = TrapezoidIntegrator { mode: BaselineMode::Original };
        let group_picker = TransitionGroupPicker {
            peak_picker: &picker,
            smoother: &smoother,
            integrator: &integrator,
            params: PickerParams { consensus: true, ..PickerParams::default() },
        };

        group_picker.pick_transition_group(&mut group).unwrap();
        assert_eq!(group.features.len(), 1);
        assert!(group.features[0].areas.contains_key("t1"));
        assert!(group.features[0].areas.contains_key("t2"));
    }

    #[test]
    fn contained_feature_window_is_treated_as_a_duplicate() {
        let already_kept = vec![MrmFeature {
            rt: RetentionTime(10.0),
            mz: MassOverCharge(0.0),
            areas: HashMap::new(),
            quality: 0.0,
            left_width: 5.0,
            right_width: 15.0,
            total_xic: 0.0,
            peak_apices_sum: 0.0,
            convex_hulls: HashMap::new(),
        }];
        assert!(contained_in_any((6.0, 14.0), &already_kept));
        assert!(contained_in_any((5.0, 15.0), &already_kept));
        assert!(!contained_in_any((4.0, 14.0), &already_kept));
        assert!(!contained_in_any((6.0, 16.0), &already_kept));
    }

    /// Spec.md §4.1 step 2 bullet 2: a feature whose integrated intensity is
    /// zero across every trace is never kept, even though its window is
    /// structurally valid.
    #[test]
    fn a_zero_area_feature_is_not_kept() {
        let chrom = Chromatogram {
            native_id: "t1".into(),
            points: vec![point(8.0, 0.0), point(10.0, 0.0), point(12.0, 0.0)],
            ..Chromatogram::default()
        };
        let mut group = MrmTransitionGroup::default();
        group.group_id = "g3".into();
        group.transitions.insert("t1".into(), detecting("t1"));
        group.chromatograms.insert("t1".into(), chrom);

        let peaks = HashMap::from([(
            "t1".to_string(),
            vec![PickedPeak { apex_rt: 10.0, left: 8.0, right: 12.0, intensity: 100.0 }],
        )]);
        let picker = FixedPicker(peaks);
        let smoother = IdentitySmoother;
        let integrator = TrapezoidIntegrator { mode: BaselineMode::Original };
        let group_picker = TransitionGroupPicker {
            peak_picker: &picker,
            smoother: &smoother,
            integrator: &integrator,
            params: PickerParams::default(),
        };

        group_picker.pick_transition_group(&mut group).unwrap();
        assert!(group.features.is_empty());
    }

    #[test]
    fn inconsistent_group_is_rejected() {
        let mut group = MrmTransitionGroup::default();
        group.transitions.insert("missing".into(), detecting("missing"));
        let picker = FixedPicker(HashMap::new());
        let smoother = IdentitySmoother;
        let integrator = TrapezoidIntegrator { mode: BaselineMode::Original };
        let group_picker = TransitionGroupPicker {
            peak_picker: &picker,
            smoother: &smoother,
            integrator: &integrator,
            params: PickerParams::default(),
        };
        assert!(group_picker.pick_transition_group(&mut group).is_err());
    }
}
