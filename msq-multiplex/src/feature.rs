//! Feature synthesis from clustered seeds (spec.md §4.2 step 4).

use crate::cluster::Cluster;
use crate::intensity::correct_peptide_intensities;
use crate::pattern::PeakPattern;
use crate::satellite::{dedup_satellites, Satellite, SeedMatch};

/// Sentinel intensity for peptide 0 that marks an unreliable ratio; the
/// caller skips the cluster entirely when this is produced.
pub const UNRELIABLE_RATIO: f64 = -1.0;

/// A bounding box over one mass trace's satellites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvexHull {
    pub rt_min: f64,
    pub rt_max: f64,
    pub mz_min: f64,
    pub mz_max: f64,
}

impl ConvexHull {
    fn from_satellites(satellites: &[&Satellite]) -> Option<Self> {
        if satellites.is_empty() {
            return None;
        }
        let rts = satellites.iter().map(|s| s.rt);
        let mzs = satellites.iter().map(|s| s.mz);
        Some(Self {
            rt_min: rts.clone().fold(f64::INFINITY, f64::min),
            rt_max: rts.fold(f64::NEG_INFINITY, f64::max),
            mz_min: mzs.clone().fold(f64::INFINITY, f64::min),
            mz_max: mzs.fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// One quantified peptide channel within a multiplet.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub peptide: usize,
    pub rt: f64,
    pub mz: f64,
    pub charge: u32,
    pub intensity: f64,
    pub overall_quality: f64,
    pub convex_hulls: Vec<ConvexHull>,
}

/// One peptide channel's contribution to a [`ConsensusFeature`].
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureHandle {
    pub map_index: usize,
    pub intensity: f64,
    pub rt: f64,
    pub mz: f64,
}

/// A multiplet anchored at peptide 0, with one handle per channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsensusFeature {
    pub anchor_rt: f64,
    pub anchor_mz: f64,
    pub handles: Vec<FeatureHandle>,
}

/// One cluster's synthesized result, or `None` if it was rejected (peptide 0
/// intensity unreliable, or the mono-isotopic trace shorter than `rt_min`).
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterFeature {
    pub features: Vec<Feature>,
    pub consensus: ConsensusFeature,
}

/// Synthesizes a feature (and its anchoring consensus feature) from one
/// cluster's union of satellites, per spec.md §4.2 step 4.
#[must_use]
pub fn synthesize_cluster_feature(
    pattern: &PeakPattern,
    seeds: &[SeedMatch],
    cluster: &Cluster,
    rt_min: f64,
) -> Option<ClusterFeature> {
    let mut satellites: Vec<Satellite> =
        cluster.members.iter().flat_map(|&i| seeds[i].satellites.iter().copied()).collect();
    dedup_satellites(&mut satellites);

    let num_peptides = pattern.isotope_count;
    let corrected = correct_peptide_intensities(&satellites, num_peptides);
    if corrected.intensities.first().copied() == Some(UNRELIABLE_RATIO) {
        return None;
    }

    let mut features = Vec::new();
    let mut handles = Vec::new();
    let mut anchor_rt = 0.0;
    let mut anchor_mz = 0.0;

    for peptide in 0..num_peptides {
        let peptide_satellites: Vec<&Satellite> = satellites.iter().filter(|s| s.peptide == peptide).collect();
        let mono_isotope: Vec<&Satellite> = peptide_satellites.iter().copied().filter(|s| s.isotope == 0).collect();
        let rt_span = mono_isotope
            .iter()
            .map(|s| s.rt)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), rt| (lo.min(rt), hi.max(rt)));
        if peptide == 0 && mono_isotope.len() > 1 && rt_span.1 - rt_span.0 < rt_min {
            return None;
        }

        let total_intensity: f64 = peptide_satellites.iter().map(|s| s.intensity).sum();
        let (rt, mz) = if total_intensity > 0.0 {
            let rt = peptide_satellites.iter().map(|s| s.rt * s.intensity).sum::<f64>() / total_intensity;
            let mz = peptide_satellites.iter().map(|s| s.mz * s.intensity).sum::<f64>() / total_intensity;
            (rt, mz)
        } else {
            (0.0, 0.0)
        };

        if peptide == 0 {
            anchor_rt = rt;
            anchor_mz = mz;
        }

        let intensity = corrected.intensities.get(peptide).copied().unwrap_or(0.0);
        let hulls_by_isotope: Vec<ConvexHull> = {
            let max_isotope = peptide_satellites.iter().map(|s| s.isotope).max().unwrap_or(0);
            (0..=max_isotope)
                .filter_map(|isotope| {
                    let trace: Vec<&Satellite> =
                        peptide_satellites.iter().copied().filter(|s| s.isotope == isotope).collect();
                    ConvexHull::from_satellites(&trace)
                })
                .collect()
        };

        features.push(Feature {
            peptide,
            rt,
            mz,
            charge: pattern.charge,
            intensity,
            overall_quality: 1.0,
            convex_hulls: hulls_by_isotope,
        });
        handles.push(FeatureHandle { map_index: peptide, intensity, rt, mz });
    }

    Some(ClusterFeature { features, consensus: ConsensusFeature { anchor_rt, anchor_mz, handles } })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::satellite::SatelliteOrigin;

    fn satellite(peptide: usize, isotope: usize, rt: f64, mz: f64, intensity: f64) -> Satellite {
        Satellite { peptide, isotope, rt, mz, intensity, origin: SatelliteOrigin::Profile }
    }

    #[test]
    fn synthesizes_one_feature_per_peptide_channel() {
        let pattern = PeakPattern { charge: 2, isotope_count: 2, mass_shifts: vec![8.0142], index: 0 };
        let seeds = vec![SeedMatch {
            seed_rt: 10.0,
            seed_mz: 500.0,
            satellites: vec![
                satellite(0, 0, 10.0, 500.0, 100.0),
                satellite(0, 0, 10.1, 500.0, 110.0),
                satellite(0, 0, 10.2, 500.0, 105.0),
                satellite(1, 0, 10.0, 504.0, 50.0),
                satellite(1, 0, 10.1, 504.0, 55.0),
                satellite(1, 0, 10.2, 504.0, 52.0),
            ],
        }];
        let cluster = Cluster { members: vec![0] };
        let result = synthesize_cluster_feature(&pattern, &seeds, &cluster, 0.0).unwrap();
        assert_eq!(result.features.len(), 2);
        assert_eq!(result.consensus.handles.len(), 2);
    }
}
