//! Peptide-intensity correction by linear regression (spec.md §4.2.1).

use msq_core::stats::linear_regression_no_intercept;

use crate::satellite::Satellite;

/// Result of [`correct_peptide_intensities`].
#[derive(Clone, Debug, PartialEq)]
pub struct CorrectedIntensities {
    /// One entry per peptide, in peptide order.
    pub intensities: Vec<f64>,
    /// `false` when fewer than 3 paired satellites were available and the
    /// raw sums were returned unchanged.
    pub corrected: bool,
}

/// `rt_p` (intensity-weighted mean RT) and `intensity_p` (raw sum) across
/// every satellite of every isotope belonging to `peptide`.
#[must_use]
pub fn peptide_rt_and_intensity(satellites: &[Satellite], peptide: usize) -> (f64, f64) {
    let relevant: Vec<&Satellite> = satellites.iter().filter(|s| s.peptide == peptide).collect();
    let total_intensity: f64 = relevant.iter().map(|s| s.intensity).sum();
    if total_intensity == 0.0 {
        return (0.0, 0.0);
    }
    let weighted_rt: f64 = relevant.iter().map(|s| s.rt * s.intensity).sum::<f64>() / total_intensity;
    (weighted_rt, total_intensity)
}

fn sorted_points(satellites: &[Satellite], peptide: usize) -> Vec<(f64, f64)> {
    let mut points: Vec<(f64, f64)> =
        satellites.iter().filter(|s| s.peptide == peptide).map(|s| (s.rt, s.intensity)).collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
}

/// Linearly interpolates `points` (sorted by RT) at `target_rt`, between the
/// bracketing samples immediately ≤ and ≥ it. `None` outside the range.
fn interpolate_at(points: &[(f64, f64)], target_rt: f64) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    if target_rt < points[0].0 || target_rt > points[points.len() - 1].0 {
        return None;
    }
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        if target_rt >= a.0 && target_rt <= b.0 {
            if (b.0 - a.0).abs() < f64::EPSILON {
                return Some(a.1);
            }
            let t = (target_rt - a.0) / (b.0 - a.0);
            return Some(a.1 + t * (b.1 - a.1));
        }
    }
    points.iter().find(|p| (p.0 - target_rt).abs() < f64::EPSILON).map(|p| p.1)
}

/// Pairs every peptide-0 satellite with an interpolated peptide-`p`
/// intensity at the RT-shifted target, per spec.md §4.2.1.
fn pair_satellites(
    sat0: &[(f64, f64)],
    sat_p: &[(f64, f64)],
    rt0: f64,
    rt_p: f64,
) -> Vec<(f64, f64)> {
    sat0.iter()
        .filter_map(|(rt, intensity)| {
            let target = rt + (rt_p - rt0);
            interpolate_at(sat_p, target).map(|ip| (*intensity, ip))
        })
        .collect()
}

/// Estimates the fold change of peptide `p` against peptide 0 as a
/// no-intercept regression slope, or `None` if fewer than 3 pairs were
/// available.
fn estimate_ratio(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 3 {
        return None;
    }
    let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
    linear_regression_no_intercept(&xs, &ys)
}

/// Implements spec.md §4.2.1 end to end: computes per-peptide RT/intensity,
/// estimates fold-change ratios against peptide 0, and projects the
/// intensities onto the fitted ratio.
///
/// For more than two peptides, peptide 0's intensity is kept fixed and
/// `I_p' = r_p * I_0` (a documented simplification of the full hyperplane
/// projection; see DESIGN.md).
#[must_use]
pub fn correct_peptide_intensities(satellites: &[Satellite], num_peptides: usize) -> CorrectedIntensities {
    let raw: Vec<(f64, f64)> = (0..num_peptides).map(|p| peptide_rt_and_intensity(satellites, p)).collect();
    let raw_intensities: Vec<f64> = raw.iter().map(|r| r.1).collect();

    if num_peptides <= 1 {
        return CorrectedIntensities { intensities: raw_intensities, corrected: false };
    }

    let (rt0, i0) = raw[0];
    let sat0 = sorted_points(satellites, 0);
    let mut ratios: Vec<Option<f64>> = vec![None; num_peptides];
    for p in 1..num_peptides {
        let (rt_p, _) = raw[p];
        let sat_p = sorted_points(satellites, p);
        let pairs = pair_satellites(&sat0, &sat_p, rt0, rt_p);
        ratios[p] = estimate_ratio(&pairs);
    }

    if num_peptides == 2 {
        return match ratios[1] {
            Some(r) => {
                let i0_corrected = (i0 + r * raw[1].1) / (1.0 + r * r);
                let i1_corrected = r * i0_corrected;
                CorrectedIntensities { intensities: vec![i0_corrected, i1_corrected], corrected: true }
            }
            None => CorrectedIntensities { intensities: raw_intensities, corrected: false },
        };
    }

    if ratios[1..].iter().all(Option::is_none) {
        return CorrectedIntensities { intensities: raw_intensities, corrected: false };
    }

    let mut intensities = vec![i0];
    for p in 1..num_peptides {
        intensities.push(ratios[p].map_or(raw[p].1, |r| r * i0));
    }
    CorrectedIntensities { intensities, corrected: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::satellite::SatelliteOrigin;

    fn satellite(peptide: usize, rt: f64, intensity: f64) -> Satellite {
        Satellite { peptide, isotope: 0, rt, mz: 500.0, intensity, origin: SatelliteOrigin::Profile }
    }

    /// Testable property 4: for exactly two peptides and slope `r`, the
    /// corrected intensities satisfy `I1'/I0' = r`.
    #[test]
    fn property4_two_peptide_correction_preserves_the_fitted_ratio() {
        let r = 2.0;
        let mut satellites = Vec::new();
        for i in 0..5 {
            let rt = 10.0 + i as f64;
            let base = 100.0 + i as f64 * 5.0;
            satellites.push(satellite(0, rt, base));
            satellites.push(satellite(1, rt + 0.5, r * base));
        }
        let result = correct_peptide_intensities(&satellites, 2);
        assert!(result.corrected);
        let ratio = result.intensities[1] / result.intensities[0];
        assert!((ratio - r).abs() < 1e-6, "ratio={ratio}");
    }

    /// Spec.md §8 scenario S4: fewer than 3 pair satellites returns the raw
    /// sums unchanged.
    #[test]
    fn s4_fewer_than_three_pairs_falls_back_to_raw_sums() {
        let satellites = vec![
            satellite(0, 10.0, 100.0),
            satellite(0, 11.0, 120.0),
            satellite(1, 10.5, 40.0),
        ];
        let result = correct_peptide_intensities(&satellites, 2);
        assert!(!result.corrected);
        assert!((result.intensities[0] - 220.0).abs() < 1e-9);
        assert!((result.intensities[1] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn a_singleton_peptide_list_is_the_identity() {
        let satellites = vec![satellite(0, 10.0, 100.0)];
        let result = correct_peptide_intensities(&satellites, 1);
        assert!(!result.corrected);
        assert_eq!(result.intensities, vec![100.0]);
    }
}
