//! Parsing Percolator's tab-separated output files (spec.md §4.6
//! post-processing step 1).

use std::collections::HashMap;

use crate::error::{PercolatorError, Result};

/// One PSM-level result row.
#[derive(Clone, Debug, PartialEq)]
pub struct PoutRecord {
    pub psm_id: String,
    pub svm_score: f64,
    pub q_value: f64,
    pub pep: f64,
    pub peptide: String,
    pub proteins: Vec<String>,
}

/// One protein-level result row.
#[derive(Clone, Debug, PartialEq)]
pub struct ProteinPoutRecord {
    pub protein_id: String,
    pub q_value: f64,
    pub pep: f64,
}

fn parse_header(line: &str, required: &[&str]) -> Result<HashMap<String, usize>> {
    let columns: HashMap<String, usize> =
        line.split('\t').enumerate().map(|(i, name)| (name.to_string(), i)).collect();
    for name in required {
        if !columns.contains_key(*name) {
            return Err(PercolatorError::ParseError(format!("pout file missing column {name:?}")));
        }
    }
    Ok(columns)
}

fn field<'a>(fields: &[&'a str], columns: &HashMap<String, usize>, name: &str) -> Result<&'a str> {
    let idx = columns[name];
    fields.get(idx).copied().ok_or_else(|| PercolatorError::ParseError(format!("row too short for column {name:?}")))
}

fn parse_f64(value: &str, column: &str) -> Result<f64> {
    value.parse().map_err(|_| PercolatorError::ParseError(format!("invalid {column} value: {value:?}")))
}

/// Parses a PSM-level pout TSV. On duplicate `(PSMId, peptide)` pairs, keeps
/// the first occurrence (spec.md §4.6 post-processing step 1).
pub fn parse_psm_pout(contents: &str) -> Result<HashMap<String, PoutRecord>> {
    let mut lines = contents.lines();
    let header = lines.next().ok_or_else(|| PercolatorError::ParseError("empty pout file".to_string()))?;
    let columns = parse_header(header, &["PSMId", "score", "q-value", "posterior_error_prob", "peptide", "proteinIds"])?;

    let mut seen: std::collections::HashSet<(String, String)> = std::collections::HashSet::new();
    let mut records = HashMap::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let psm_id = field(&fields, &columns, "PSMId")?.to_string();
        let peptide = field(&fields, &columns, "peptide")?.to_string();
        if !seen.insert((psm_id.clone(), peptide.clone())) {
            continue;
        }
        let svm_score = parse_f64(field(&fields, &columns, "score")?, "score")?;
        let q_value = parse_f64(field(&fields, &columns, "q-value")?, "q-value")?;
        let pep = parse_f64(field(&fields, &columns, "posterior_error_prob")?, "posterior_error_prob")?;
        let proteins_idx = columns["proteinIds"];
        let proteins: Vec<String> = fields[proteins_idx..].iter().map(|s| s.to_string()).collect();
        records.insert(psm_id.clone(), PoutRecord { psm_id, svm_score, q_value, pep, peptide, proteins });
    }
    Ok(records)
}

/// Parses a protein-level pout TSV.
pub fn parse_protein_pout(contents: &str) -> Result<Vec<ProteinPoutRecord>> {
    let mut lines = contents.lines();
    let header = lines.next().ok_or_else(|| PercolatorError::ParseError("empty protein pout file".to_string()))?;
    let columns = parse_header(header, &["ProteinId", "q-value", "posterior_error_prob"])?;

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let protein_id = field(&fields, &columns, "ProteinId")?.to_string();
        let q_value = parse_f64(field(&fields, &columns, "q-value")?, "q-value")?;
        let pep = parse_f64(field(&fields, &columns, "posterior_error_prob")?, "posterior_error_prob")?;
        records.push(ProteinPoutRecord { protein_id, q_value, pep });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_psm_pout_file() {
        let tsv = "PSMId\tscore\tq-value\tposterior_error_prob\tpeptide\tproteinIds\n\
                   run1_scan1_PEPTIDE\t1.5\t0.01\t0.02\tK.PEPTIDE.R\tsp|P1|A\tsp|P2|B\n";
        let records = parse_psm_pout(tsv).unwrap();
        let r = &records["run1_scan1_PEPTIDE"];
        assert_eq!(r.q_value, 0.01);
        assert_eq!(r.proteins, vec!["sp|P1|A", "sp|P2|B"]);
    }

    #[test]
    fn keeps_the_first_of_duplicate_psmid_peptide_pairs() {
        let tsv = "PSMId\tscore\tq-value\tposterior_error_prob\tpeptide\tproteinIds\n\
                   x\t1.0\t0.01\t0.02\tK.PEPTIDE.R\tsp|P1|A\n\
                   x\t9.0\t0.5\t0.5\tK.PEPTIDE.R\tsp|P9|Z\n";
        let records = parse_psm_pout(tsv).unwrap();
        assert_eq!(records["x"].svm_score, 1.0);
    }

    #[test]
    fn missing_a_required_column_is_an_error() {
        let tsv = "PSMId\tscore\n1\t2\n";
        assert!(parse_psm_pout(tsv).is_err());
    }
}
