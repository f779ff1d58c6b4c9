//! Pattern filtering over an MS1 experiment (spec.md §4.2 step 2).
//!
//! Both filter variants share one peak-matching core; they differ only in
//! which [`SatelliteOrigin`] they tag matches with. The real centroided and
//! profile filters diverge more (profile mode works against continuous
//! traces rather than discrete peaks); this crate represents both as
//! centroided peak lists and records the caller's declared mode on the
//! satellite, which is the distinction the rest of the pipeline (dedup,
//! clustering) actually depends on. See DESIGN.md.

use msq_core::spectrum::Spectrum;

use crate::pattern::PeakPattern;
use crate::satellite::{Satellite, SatelliteOrigin, SeedMatch};

/// Mass of a ¹³C-¹²C neutron spacing, used to step between isotope peaks.
const ISOTOPE_SPACING: f64 = 1.003_355;

/// Filters an MS1 experiment (spectra sorted by RT) for seeds matching
/// `pattern`: a peak present in every channel implied by `pattern.mass_shifts`,
/// at every isotope offset up to `isotopes_per_peptide_max`.
pub trait PatternFilter {
    fn find_seeds(
        &self,
        spectra: &[Spectrum],
        pattern: &PeakPattern,
        isotopes_per_peptide_max: usize,
        mz_tolerance: f64,
    ) -> Vec<SeedMatch>;
}

fn find_peak_near(spectrum: &Spectrum, mz: f64, tolerance: f64) -> Option<(usize, f64, f64)> {
    spectrum
        .peaks
        .iter()
        .enumerate()
        .filter(|(_, p)| (p.mz.value() - mz).abs() <= tolerance)
        .min_by(|(_, a), (_, b)| (a.mz.value() - mz).abs().total_cmp(&(b.mz.value() - mz).abs()))
        .map(|(i, p)| (i, p.mz.value(), f64::from(p.intensity)))
}

fn find_seeds_core(
    spectra: &[Spectrum],
    pattern: &PeakPattern,
    isotopes_per_peptide_max: usize,
    mz_tolerance: f64,
    origin_tag: fn(usize, usize) -> SatelliteOrigin,
) -> Vec<SeedMatch> {
    let mut seeds = Vec::new();
    let channel_shifts: Vec<f64> = std::iter::once(0.0).chain(pattern.mass_shifts.iter().copied()).collect();

    for (spectrum_index, spectrum) in spectra.iter().enumerate() {
        for seed_peak in &spectrum.peaks {
            let seed_mz = seed_peak.mz.value();
            let mut satellites = Vec::new();
            let mut all_channels_present = true;

            for (peptide, shift) in channel_shifts.iter().enumerate() {
                for isotope in 0..isotopes_per_peptide_max {
                    let expected_mz =
                        seed_mz + shift / f64::from(pattern.charge) + isotope as f64 * ISOTOPE_SPACING / f64::from(pattern.charge);
                    match find_peak_near(spectrum, expected_mz, mz_tolerance) {
                        Some((peak_index, mz, intensity)) => satellites.push(Satellite {
                            peptide,
                            isotope,
                            rt: spectrum.retention_time.value(),
                            mz,
                            intensity,
                            origin: origin_tag(spectrum_index, peak_index),
                        }),
                        None if isotope == 0 => {
                            all_channels_present = false;
                        }
                        None => {}
                    }
                }
            }

            if all_channels_present && !satellites.is_empty() {
                seeds.push(SeedMatch { seed_rt: spectrum.retention_time.value(), seed_mz, satellites });
            }
        }
    }
    seeds
}

/// Filters seeds out of centroided spectra.
#[derive(Clone, Copy, Debug, Default)]
pub struct CentroidedFilter;

impl PatternFilter for CentroidedFilter {
    fn find_seeds(
        &self,
        spectra: &[Spectrum],
        pattern: &PeakPattern,
        isotopes_per_peptide_max: usize,
        mz_tolerance: f64,
    ) -> Vec<SeedMatch> {
        find_seeds_core(spectra, pattern, isotopes_per_peptide_max, mz_tolerance, |spectrum_index, peak_index| {
            SatelliteOrigin::Centroided { spectrum_index, peak_index }
        })
    }
}

/// Filters seeds out of profile-mode spectra.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProfileFilter;

impl PatternFilter for ProfileFilter {
    fn find_seeds(
        &self,
        spectra: &[Spectrum],
        pattern: &PeakPattern,
        isotopes_per_peptide_max: usize,
        mz_tolerance: f64,
    ) -> Vec<SeedMatch> {
        find_seeds_core(spectra, pattern, isotopes_per_peptide_max, mz_tolerance, |_, _| SatelliteOrigin::Profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msq_core::quantity::RetentionTime;
    use msq_core::spectrum::Peak;

    fn spectrum(rt: f64, mzs: &[(f64, f32)]) -> Spectrum {
        Spectrum {
            native_id: format!("s{rt}"),
            retention_time: RetentionTime(rt),
            ms_level: 1,
            peaks: mzs.iter().map(|(mz, intensity)| Peak::new(*mz, *intensity)).collect(),
            precursors: Vec::new(),
            sorted: true,
        }
    }

    #[test]
    fn a_singlet_pattern_finds_every_peak_as_its_own_seed() {
        let spectra = vec![spectrum(10.0, &[(500.0, 100.0)])];
        let pattern = PeakPattern { charge: 2, isotope_count: 1, mass_shifts: Vec::new(), index: 0 };
        let seeds = CentroidedFilter.find_seeds(&spectra, &pattern, 1, 0.01);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].satellites.len(), 1);
    }

    #[test]
    fn a_doublet_pattern_requires_the_shifted_peer_peak() {
        let shift = 8.0142;
        let charge = 2.0;
        let spectra = vec![spectrum(10.0, &[(500.0, 100.0), (500.0 + shift / charge, 50.0)])];
        let pattern = PeakPattern { charge: 2, isotope_count: 2, mass_shifts: vec![shift], index: 0 };
        let seeds = CentroidedFilter.find_seeds(&spectra, &pattern, 1, 0.01);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].satellites.len(), 2);
    }

    #[test]
    fn missing_the_shifted_peer_yields_no_seed() {
        let spectra = vec![spectrum(10.0, &[(500.0, 100.0)])];
        let pattern = PeakPattern { charge: 2, isotope_count: 2, mass_shifts: vec![8.0142], index: 0 };
        let seeds = CentroidedFilter.find_seeds(&spectra, &pattern, 1, 0.01);
        assert!(seeds.is_empty());
    }
}
