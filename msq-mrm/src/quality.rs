//! Feature quality scoring via cross-correlation (spec.md §4.1.3): shape
//! similarity (zero-lag correlation), co-elution (best lag near zero), and a
//! potential-outlier flag for a trace whose profile disagrees with its peers.

use msq_core::chromatogram::Chromatogram;
use msq_core::stats::{mean, pearson_correlation};

use crate::integration::interpolate;

/// Result of [`score_feature`].
#[derive(Clone, Debug, PartialEq)]
pub struct QualityScore {
    /// Mean zero-lag pairwise correlation across all traces (higher is
    /// better; `1.0` for a single trace).
    pub score: f64,
    /// The lag (in samples) that maximizes total pairwise correlation.
    pub best_lag: i32,
    /// `true` if at least one trace's average correlation to its peers is
    /// less than half the group average (likely a misassigned or
    /// interfering transition).
    pub potential_outlier: bool,
}

/// Resamples `chromatogram`'s intensity onto a uniform grid over `[left,
/// right]` with `n` points.
#[must_use]
pub fn resample(chromatogram: &Chromatogram, left: f64, right: f64, n: usize) -> Vec<f64> {
    if n == 0 || right <= left {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let t = left + (right - left) * (i as f64) / ((n - 1).max(1) as f64);
            interpolate(chromatogram, t)
        })
        .collect()
}

/// Pearson correlation between `a` and `b` shifted by `lag` samples
/// (positive shifts `b` later), restricted to their overlap.
fn correlation_at_lag(a: &[f64], b: &[f64], lag: i32) -> f64 {
    let n = a.len().min(b.len()) as i32;
    if n < 2 {
        return 0.0;
    }
    let (a_start, b_start) = if lag >= 0 { (lag, 0) } else { (0, -lag) };
    let overlap = n - lag.abs();
    if overlap < 2 {
        return 0.0;
    }
    let a_slice: Vec<f64> = (0..overlap).map(|i| a[(a_start + i) as usize]).collect();
    let b_slice: Vec<f64> = (0..overlap).map(|i| b[(b_start + i) as usize]).collect();
    pearson_correlation(&a_slice, &b_slice)
}

/// Scores a set of resampled intensity profiles (one per transition) for one
/// candidate feature window. `max_lag` bounds the lag search.
#[must_use]
pub fn score_feature(profiles: &[Vec<f64>], max_lag: i32) -> QualityScore {
    if profiles.len() < 2 {
        return QualityScore { score: 1.0, best_lag: 0, potential_outlier: false };
    }

    let mut best_lag = 0;
    let mut best_total = f64::NEG_INFINITY;
    for lag in -max_lag..=max_lag {
        let total: f64 = pairwise(profiles, |a, b| correlation_at_lag(a, b, lag)).iter().sum();
        if total > best_total {
            best_total = total;
            best_lag = lag;
        }
    }

    let zero_lag: Vec<f64> = pairwise(profiles, |a, b| correlation_at_lag(a, b, 0));
    let score = mean(&zero_lag);

    let per_trace_avg = per_trace_average(profiles, &zero_lag);
    let group_avg = mean(&per_trace_avg);
    let potential_outlier = group_avg > 0.0
        && per_trace_avg.iter().any(|avg| *avg < group_avg / 2.0);

    QualityScore { score, best_lag, potential_outlier }
}

fn pairwise(profiles: &[Vec<f64>], f: impl Fn(&[f64], &[f64]) -> f64) -> Vec<f64> {
    let mut out = Vec::new();
    for i in 0..profiles.len() {
        for j in (i + 1)..profiles.len() {
            out.push(f(&profiles[i], &profiles[j]));
        }
    }
    out
}

fn per_trace_average(profiles: &[Vec<f64>], pairwise_zero_lag: &[f64]) -> Vec<f64> {
    let n = profiles.len();
    let mut sums = vec![0.0; n];
    let mut counts = vec![0usize; n];
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            sums[i] += pairwise_zero_lag[k];
            sums[j] += pairwise_zero_lag[k];
            counts[i] += 1;
            counts[j] += 1;
            k += 1;
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(s, c)| if *c > 0 { s / *c as f64 } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_profiles_score_near_one_with_zero_lag() {
        let profile = vec![0.0, 10.0, 50.0, 10.0, 0.0];
        let score = score_feature(&[profile.clone(), profile.clone(), profile], 2);
        assert!((score.score - 1.0).abs() < 1e-6);
        assert_eq!(score.best_lag, 0);
        assert!(!score.potential_outlier);
    }

    #[test]
    fn a_shifted_profile_is_still_found_at_its_true_lag() {
        let a = vec![0.0, 0.0, 10.0, 50.0, 10.0, 0.0, 0.0];
        let b = vec![0.0, 10.0, 50.0, 10.0, 0.0, 0.0, 0.0];
        let score = score_feature(&[a, b], 3);
        assert_eq!(score.best_lag, -1);
    }

    #[test]
    fn an_uncorrelated_trace_is_flagged_as_a_potential_outlier() {
        let shared = vec![0.0, 10.0, 50.0, 10.0, 0.0];
        let noise = vec![40.0, 2.0, 30.0, 1.0, 45.0];
        let score = score_feature(&[shared.clone(), shared, noise], 1);
        assert!(score.potential_outlier);
    }
}
