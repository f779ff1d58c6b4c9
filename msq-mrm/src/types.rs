//! Shared value types for the picker (§4.1).

/// One peak an external [`crate::traits::PeakPicker`] reports for a single
/// chromatogram.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickedPeak {
    /// Apex retention time.
    pub apex_rt: f64,
    /// Left picked boundary (inclusive).
    pub left: f64,
    /// Right picked boundary (inclusive).
    pub right: f64,
    /// Apex intensity. Zeroed out once consumed by a feature.
    pub intensity: f64,
}

impl PickedPeak {
    /// Width of the picked interval.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// `true` iff `[left, right]` overlaps `window`.
    #[must_use]
    pub fn overlaps(&self, window: (f64, f64)) -> bool {
        self.left <= window.1 && self.right >= window.0
    }
}

/// Seed-selection policy (spec §4.1 step 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Global-intensity argmax.
    Largest,
    /// Maximum `right - left` boundary width.
    Widest,
}

/// Which chromatogram variant §4.1.4 resamples onto the master grid: the
/// raw picked chromatogram, or the one returned by the [`crate::traits::Smoother`]
/// collaborator. This is the `peak_integration` parameter named in spec.md
/// §7: an unrecognized literal is a fatal `IllegalArgument`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResampleSource {
    /// Resample the chromatogram as picked, before smoothing.
    Original,
    /// Resample the smoothed chromatogram.
    Smoothed,
}

impl ResampleSource {
    /// Parses the `peak_integration` configuration literal.
    pub fn parse(literal: &str) -> crate::error::Result<Self> {
        match literal {
            "original" => Ok(Self::Original),
            "smoothed" => Ok(Self::Smoothed),
            other => Err(crate::error::MrmError::IllegalArgument(format!(
                "unrecognized peak_integration literal: {other:?}"
            ))),
        }
    }
}

/// Baseline/background-subtraction strategy used during integration (§4.1.4).
/// A distinct axis from [`ResampleSource`]: spec.md §4.1.4 names both
/// `original`/`exact` literals for this choice separately from the
/// `peak_integration` resampling parameter above.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaselineMode {
    /// Subtract the trapezoid formed by the window's edge intensities from
    /// the raw trapezoid area.
    Original,
    /// Subtract an externally estimated background (collaborator; see
    /// [`crate::integration::Integrator`]).
    Exact,
}

impl BaselineMode {
    /// Parses the baseline-subtraction configuration literal.
    pub fn parse(literal: &str) -> crate::error::Result<Self> {
        match literal {
            "original" => Ok(Self::Original),
            "exact" => Ok(Self::Exact),
            other => Err(crate::error::MrmError::IllegalArgument(format!(
                "unrecognized baseline-mode literal: {other:?}"
            ))),
        }
    }
}

/// Tunables for [`crate::picker::TransitionGroupPicker`].
#[derive(Clone, Copy, Debug)]
pub struct PickerParams {
    /// Seed-selection policy.
    pub seed_policy: SeedPolicy,
    /// Whether to run consensus-mode feature construction (§4.1.1).
    pub consensus: bool,
    /// Whether to recompute consensus borders (§4.1.2).
    pub border_recalculation: bool,
    /// Minimum feature width; narrower seeds are discarded.
    pub min_peak_width: f64,
    /// Whether to score and filter by quality (§4.1.3).
    pub quality_scoring: bool,
    /// Minimum acceptable quality score.
    pub min_qual: f64,
    /// Stop after this many features, if set.
    pub stop_after_feature: Option<usize>,
    /// Stop once `feature_intensity / total_xic` drops below this ratio.
    pub stop_after_intensity_ratio: Option<f64>,
    /// Outlier-boundary z-score threshold for border recalculation.
    pub max_z: f64,
    /// Which chromatogram variant (original or smoothed) feeds integration.
    pub peak_integration: ResampleSource,
}

impl Default for PickerParams {
    fn default() -> Self {
        Self {
            seed_policy: SeedPolicy::Largest,
            consensus: true,
            border_recalculation: true,
            min_peak_width: 0.0,
            quality_scoring: false,
            min_qual: 0.0,
            stop_after_feature: None,
            stop_after_intensity_ratio: None,
            max_z: 3.0,
            peak_integration: ResampleSource::Original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_source_parses_both_literals() {
        assert_eq!(ResampleSource::parse("original").unwrap(), ResampleSource::Original);
        assert_eq!(ResampleSource::parse("smoothed").unwrap(), ResampleSource::Smoothed);
    }

    #[test]
    fn resample_source_rejects_unknown_literal() {
        assert!(ResampleSource::parse("bogus").is_err());
    }

    #[test]
    fn baseline_mode_parses_both_literals() {
        assert_eq!(BaselineMode::parse("original").unwrap(), BaselineMode::Original);
        assert_eq!(BaselineMode::parse("exact").unwrap(), BaselineMode::Exact);
    }

    #[test]
    fn baseline_mode_rejects_unknown_literal() {
        assert!(BaselineMode::parse("bogus").is_err());
    }
}
