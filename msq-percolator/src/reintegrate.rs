//! Reintegrating Percolator's output back into identifications (spec.md
//! §4.6 post-processing).

use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;

use crate::config::ScoreType;
use crate::pin::Psm;
use crate::pout::{PoutRecord, ProteinPoutRecord};

/// Sentinel SVM score assigned to a PSM Percolator did not retain.
pub const MISSED_SVM_SCORE: f64 = -100.0;
/// Sentinel q-value/PEP assigned to a PSM Percolator did not retain.
pub const MISSED_Q_AND_PEP: f64 = 1.0;

/// One PSM after reintegration: either a Percolator hit or a miss filled
/// with the spec's sentinel values.
#[derive(Clone, Debug, PartialEq)]
pub struct ReintegratedPsm {
    pub psm_id: String,
    pub was_retained: bool,
    pub old_score: Option<f64>,
    pub svm_score: f64,
    pub q_value: f64,
    pub pep: f64,
    pub main_score: f64,
    pub main_score_higher_is_better: bool,
}

fn main_score_for(score_type: ScoreType, svm: f64, q: f64, pep: f64) -> (f64, bool) {
    match score_type {
        ScoreType::QValue => (q, false),
        ScoreType::Pep => (pep, false),
        ScoreType::Svm => (svm, true),
    }
}

/// Reintegrates every input PSM against Percolator's output map, per
/// spec.md §4.6 post-processing steps 2-3.
#[must_use]
pub fn reintegrate_psms(psms: &[Psm], pout: &HashMap<String, PoutRecord>, score_type: ScoreType) -> Vec<ReintegratedPsm> {
    psms.iter()
        .map(|psm| {
            let psm_id = psm.psm_id();
            let old_score = psm.search_engine_features.values().next().copied();
            match pout.get(&psm_id) {
                Some(record) => {
                    let (main_score, higher_is_better) =
                        main_score_for(score_type, record.svm_score, record.q_value, record.pep);
                    ReintegratedPsm {
                        psm_id,
                        was_retained: true,
                        old_score,
                        svm_score: record.svm_score,
                        q_value: record.q_value,
                        pep: record.pep,
                        main_score,
                        main_score_higher_is_better: higher_is_better,
                    }
                }
                None => {
                    let (main_score, higher_is_better) =
                        main_score_for(score_type, MISSED_SVM_SCORE, MISSED_Q_AND_PEP, MISSED_Q_AND_PEP);
                    ReintegratedPsm {
                        psm_id,
                        was_retained: false,
                        old_score,
                        svm_score: MISSED_SVM_SCORE,
                        q_value: MISSED_Q_AND_PEP,
                        pep: MISSED_Q_AND_PEP,
                        main_score,
                        main_score_higher_is_better: higher_is_better,
                    }
                }
            }
        })
        .collect()
}

/// An indistinguishable-protein group: members sharing identical (q, PEP)
/// scores from Percolator's protein-level output.
#[derive(Clone, Debug, PartialEq)]
pub struct ProteinGroup {
    pub members: Vec<String>,
    pub q_value: f64,
    pub pep: f64,
}

/// Attaches protein-level q/PEP to every protein present in both
/// `original_proteins` and `protein_pout`, warns (returns as `warnings`)
/// about proteins Percolator reported that were absent from the input, and
/// groups proteins with identical scores as indistinguishable.
#[must_use]
pub fn rebuild_protein_groups(
    original_proteins: &[String],
    protein_pout: &[ProteinPoutRecord],
) -> (Vec<ProteinGroup>, Vec<String>) {
    let original: std::collections::HashSet<&str> = original_proteins.iter().map(String::as_str).collect();
    let mut warnings = Vec::new();
    let mut by_score: BTreeMap<(OrderedFloat<f64>, OrderedFloat<f64>), Vec<String>> = BTreeMap::new();

    for record in protein_pout {
        if !original.contains(record.protein_id.as_str()) {
            warnings.push(format!(
                "percolator reported protein {:?} which is absent from the input",
                record.protein_id
            ));
            continue;
        }
        by_score
            .entry((OrderedFloat(record.q_value), OrderedFloat(record.pep)))
            .or_default()
            .push(record.protein_id.clone());
    }

    let groups = by_score
        .into_iter()
        .map(|((q, pep), members)| ProteinGroup { members, q_value: q.0, pep: pep.0 })
        .collect();
    (groups, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    fn psm(scan: &str, seq: &str) -> Psm {
        Psm {
            file_identifier: "run1_".into(),
            scan_identifier: scan.into(),
            scan_nr: 1,
            is_decoy: false,
            exp_mass: 1000.0,
            calc_mass: 1000.0,
            charge: 2,
            pre_aa: 'K',
            post_aa: 'R',
            sequence: seq.into(),
            proteins: vec!["sp|P1|A".into()],
            search_engine_features: Map::from([("xcorr".to_string(), 2.5)]),
        }
    }

    /// Spec.md §8 scenario S5: 3 PSMs, Percolator retains 2; the missed PSM
    /// gets SVM = -100, q = 1, PEP = 1, main score = 1 (q-value/pep) or -100
    /// (svm).
    #[test]
    fn s5_missed_psm_gets_sentinel_scores() {
        let psms = vec![psm("s1_", "AAA"), psm("s2_", "BBB"), psm("s3_", "CCC")];
        let mut pout = HashMap::new();
        pout.insert(
            psms[0].psm_id(),
            PoutRecord { psm_id: psms[0].psm_id(), svm_score: 2.0, q_value: 0.01, pep: 0.02, peptide: "AAA".into(), proteins: vec![] },
        );
        pout.insert(
            psms[1].psm_id(),
            PoutRecord { psm_id: psms[1].psm_id(), svm_score: 1.0, q_value: 0.02, pep: 0.04, peptide: "BBB".into(), proteins: vec![] },
        );

        let reintegrated = reintegrate_psms(&psms, &pout, ScoreType::QValue);
        let missed = reintegrated.iter().find(|r| r.psm_id == psms[2].psm_id()).unwrap();
        assert!(!missed.was_retained);
        assert_eq!(missed.svm_score, -100.0);
        assert_eq!(missed.q_value, 1.0);
        assert_eq!(missed.pep, 1.0);
        assert_eq!(missed.main_score, 1.0);

        let reintegrated_svm = reintegrate_psms(&psms, &pout, ScoreType::Svm);
        let missed_svm = reintegrated_svm.iter().find(|r| r.psm_id == psms[2].psm_id()).unwrap();
        assert_eq!(missed_svm.main_score, -100.0);
    }

    #[test]
    fn a_retained_psm_uses_percolators_scores() {
        let psms = vec![psm("s1_", "AAA")];
        let mut pout = HashMap::new();
        pout.insert(
            psms[0].psm_id(),
            PoutRecord { psm_id: psms[0].psm_id(), svm_score: 3.5, q_value: 0.005, pep: 0.01, peptide: "AAA".into(), proteins: vec![] },
        );
        let reintegrated = reintegrate_psms(&psms, &pout, ScoreType::Svm);
        assert!(reintegrated[0].was_retained);
        assert_eq!(reintegrated[0].main_score, 3.5);
        assert!(reintegrated[0].main_score_higher_is_better);
    }

    #[test]
    fn protein_groups_warn_about_proteins_absent_from_input() {
        let original = vec!["sp|P1|A".to_string()];
        let protein_pout = vec![
            ProteinPoutRecord { protein_id: "sp|P1|A".into(), q_value: 0.01, pep: 0.02 },
            ProteinPoutRecord { protein_id: "sp|P9|GHOST".into(), q_value: 0.01, pep: 0.02 },
        ];
        let (groups, warnings) = rebuild_protein_groups(&original, &protein_pout);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members, vec!["sp|P1|A".to_string()]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn proteins_with_identical_scores_are_grouped_as_indistinguishable() {
        let original = vec!["sp|P1|A".to_string(), "sp|P2|B".to_string()];
        let protein_pout = vec![
            ProteinPoutRecord { protein_id: "sp|P1|A".into(), q_value: 0.01, pep: 0.02 },
            ProteinPoutRecord { protein_id: "sp|P2|B".into(), q_value: 0.01, pep: 0.02 },
        ];
        let (groups, _) = rebuild_protein_groups(&original, &protein_pout);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 2);
    }
}
