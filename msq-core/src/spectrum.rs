//! Spectra: ordered (m/z, intensity) peak lists with acquisition metadata.
//! See spec.md §3.

use serde::{Deserialize, Serialize};

use crate::quantity::{MassOverCharge, RetentionTime};

/// A single centroided peak.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Mass-to-charge ratio.
    pub mz: MassOverCharge,
    /// Detector intensity.
    pub intensity: f32,
}

impl Peak {
    /// Construct a new peak.
    #[must_use]
    pub fn new(mz: f64, intensity: f32) -> Self {
        Self {
            mz: MassOverCharge(mz),
            intensity,
        }
    }
}

/// One precursor ion selected for fragmentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Precursor {
    /// Selected mass-to-charge ratio.
    pub mz: MassOverCharge,
    /// Charge state, if known.
    pub charge: Option<i16>,
    /// Isolation window width in m/z, if known.
    pub isolation_width: Option<f64>,
}

/// A mass spectrum: an ordered sequence of peaks plus acquisition metadata.
///
/// Invariant: if `sorted` is `true`, `peaks` is non-decreasing in `mz`.
/// Produced by an acquisition loader (out of scope here); consumed
/// read-mostly by everything downstream.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Spectrum {
    /// Native identifier string, as assigned by the acquisition software.
    pub native_id: String,
    /// MS level (1 for survey scans, 2+ for fragmentation scans).
    pub ms_level: u8,
    /// Retention time at which this spectrum was recorded.
    pub retention_time: RetentionTime,
    /// Precursor ions that produced this spectrum (empty for MS1).
    pub precursors: Vec<Precursor>,
    /// The peak list.
    pub peaks: Vec<Peak>,
    /// Whether `peaks` is guaranteed sorted by ascending m/z.
    pub sorted: bool,
}

impl Spectrum {
    /// `true` iff `sorted` is set and `peaks` is actually non-decreasing in
    /// m/z; used to validate the invariant rather than merely assert it.
    #[must_use]
    pub fn is_sorted_claim_valid(&self) -> bool {
        !self.sorted || self.peaks.windows(2).all(|w| w[0].mz.value() <= w[1].mz.value())
    }

    /// Sort the peak list by ascending m/z and mark it as sorted.
    pub fn sort_by_mz(&mut self) {
        self.peaks
            .sort_by(|a, b| a.mz.value().total_cmp(&b.mz.value()));
        self.sorted = true;
    }

    /// Total ion current: the sum of all peak intensities.
    #[must_use]
    pub fn total_ion_current(&self) -> f64 {
        self.peaks.iter().map(|p| f64::from(p.intensity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_mz_establishes_the_invariant() {
        let mut spectrum = Spectrum {
            peaks: vec![Peak::new(300.0, 10.0), Peak::new(100.0, 20.0)],
            ..Spectrum::default()
        };
        assert!(!spectrum.is_sorted_claim_valid() || spectrum.sorted);
        spectrum.sort_by_mz();
        assert!(spectrum.is_sorted_claim_valid());
        assert_eq!(spectrum.peaks[0].mz.value(), 100.0);
    }
}
