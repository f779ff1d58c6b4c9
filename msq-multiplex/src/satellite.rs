//! Satellite peaks: the observed support for one peptide/isotope slot of a
//! multiplex pattern (spec.md §3).

/// Where a satellite's coordinates came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SatelliteOrigin {
    /// A centroided peak, addressed by (spectrum, peak) index.
    Centroided { spectrum_index: usize, peak_index: usize },
    /// A raw profile sample.
    Profile,
}

/// One observed support point for a `(peptide, isotope)` slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Satellite {
    pub peptide: usize,
    pub isotope: usize,
    pub rt: f64,
    pub mz: f64,
    pub intensity: f64,
    pub origin: SatelliteOrigin,
}

/// A seed (one multiplet candidate) together with the satellites collected
/// for every `(peptide, isotope)` slot up to `isotopes_per_peptide_max`.
#[derive(Clone, Debug, Default)]
pub struct SeedMatch {
    pub seed_rt: f64,
    pub seed_mz: f64,
    pub satellites: Vec<Satellite>,
}

/// Deduplicates satellites of a seed: in centroided mode, by
/// `(spectrum_index, peak_index)`; in profile mode, by `(rt, mz, intensity)`.
pub fn dedup_satellites(satellites: &mut Vec<Satellite>) {
    let mut seen = std::collections::HashSet::new();
    satellites.retain(|s| {
        let key = match s.origin {
            SatelliteOrigin::Centroided { spectrum_index, peak_index } => {
                (spectrum_index as i64, peak_index as i64, 0i64)
            }
            SatelliteOrigin::Profile => (
                s.rt.to_bits() as i64,
                s.mz.to_bits() as i64,
                s.intensity.to_bits() as i64,
            ),
        };
        seen.insert(key)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_removes_repeated_centroided_indices() {
        let mut satellites = vec![
            Satellite {
                peptide: 0,
                isotope: 0,
                rt: 1.0,
                mz: 500.0,
                intensity: 10.0,
                origin: SatelliteOrigin::Centroided { spectrum_index: 1, peak_index: 2 },
            },
            Satellite {
                peptide: 0,
                isotope: 0,
                rt: 1.0,
                mz: 500.0,
                intensity: 10.0,
                origin: SatelliteOrigin::Centroided { spectrum_index: 1, peak_index: 2 },
            },
        ];
        dedup_satellites(&mut satellites);
        assert_eq!(satellites.len(), 1);
    }
}
