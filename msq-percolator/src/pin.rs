//! PIN feature matrix construction (spec.md §4.6 pre-processing step 4).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::error::{PercolatorError, Result};

/// One peptide-spectrum match as read from an input identification run,
/// before Percolator sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct Psm {
    pub file_identifier: String,
    pub scan_identifier: String,
    pub scan_nr: i64,
    pub is_decoy: bool,
    pub exp_mass: f64,
    pub calc_mass: f64,
    pub charge: u32,
    /// Residues before/after the peptide in the parent protein, `'-'` at a
    /// terminus.
    pub pre_aa: char,
    pub post_aa: char,
    pub sequence: String,
    pub proteins: Vec<String>,
    /// Engine-specific scores, folded into extra PIN columns.
    pub search_engine_features: BTreeMap<String, f64>,
}

impl Psm {
    /// Peptide length, used both as a PIN feature and for mass-per-residue
    /// features.
    #[must_use]
    pub fn peptide_length(&self) -> usize {
        self.sequence.chars().count()
    }

    /// Reconstructs the canonical PSM identifier used to rejoin Percolator's
    /// output to this PSM (spec.md §4.6 post-processing step 2).
    #[must_use]
    pub fn psm_id(&self) -> String {
        format!("{}{}{}", self.file_identifier, self.scan_identifier, self.sequence)
    }

    /// Encodes the peptide in Percolator's dot notation: `preAA.SEQUENCE.postAA`,
    /// with `'-'` termini rendered as `[`/`]`.
    #[must_use]
    pub fn dot_notation(&self) -> String {
        let pre = if self.pre_aa == '-' { '[' } else { self.pre_aa };
        let post = if self.post_aa == '-' { ']' } else { self.post_aa };
        format!("{pre}.{}.{post}", self.sequence)
    }
}

/// Builds the PIN feature matrix and writes it as Percolator's tab-separated
/// input format.
#[derive(Clone, Debug, Default)]
pub struct PinBuilder {
    pub charge_min: u32,
    pub charge_max: u32,
    pub extra_feature_names: Vec<String>,
}

impl PinBuilder {
    #[must_use]
    pub fn new(charge_min: u32, charge_max: u32, extra_feature_names: Vec<String>) -> Self {
        Self { charge_min, charge_max, extra_feature_names }
    }

    fn column_names(&self) -> Vec<String> {
        let mut columns = vec![
            "SpecId".to_string(),
            "Label".to_string(),
            "ScanNr".to_string(),
            "ExpMass".to_string(),
            "CalcMass".to_string(),
            "mass".to_string(),
            "peplen".to_string(),
        ];
        for c in self.charge_min..=self.charge_max {
            columns.push(format!("charge_{c}"));
        }
        columns.push("enzN".to_string());
        columns.push("enzC".to_string());
        columns.push("dM".to_string());
        columns.push("absdM".to_string());
        columns.extend(self.extra_feature_names.iter().cloned());
        columns.push("Peptide".to_string());
        columns.push("Proteins".to_string());
        columns
    }

    fn row(&self, psm: &Psm) -> Result<String> {
        let mut row = String::new();
        let _ = write!(row, "{}", psm.psm_id());
        let label = if psm.is_decoy { -1 } else { 1 };
        let _ = write!(row, "\t{label}\t{}\t{}\t{}\t{}\t{}", psm.scan_nr, psm.exp_mass, psm.calc_mass, psm.exp_mass, psm.peptide_length());
        for c in self.charge_min..=self.charge_max {
            let _ = write!(row, "\t{}", u8::from(psm.charge == c));
        }
        let enz_n = u8::from(psm.pre_aa == '-' || psm.pre_aa == 'K' || psm.pre_aa == 'R');
        let enz_c = u8::from(psm.sequence.ends_with(['K', 'R']) || psm.post_aa == '-');
        let d_mass = psm.exp_mass - psm.calc_mass;
        let _ = write!(row, "\t{enz_n}\t{enz_c}\t{d_mass}\t{}", d_mass.abs());
        for name in &self.extra_feature_names {
            let value = psm.search_engine_features.get(name).copied().ok_or_else(|| {
                PercolatorError::MissingInformation(format!("psm {} is missing feature {name:?}", psm.psm_id()))
            })?;
            let _ = write!(row, "\t{value}");
        }
        let proteins = if psm.proteins.is_empty() { "-".to_string() } else { psm.proteins.join("\t") };
        let _ = write!(row, "\t{}\t{proteins}", psm.dot_notation());
        Ok(row)
    }

    /// Builds the full PIN document as a TSV string (one header line, one
    /// row per PSM).
    pub fn build_tsv(&self, psms: &[Psm]) -> Result<String> {
        let mut out = self.column_names().join("\t");
        out.push('\n');
        for psm in psms {
            out.push_str(&self.row(psm)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn psm() -> Psm {
        Psm {
            file_identifier: "run1_".into(),
            scan_identifier: "scan42_".into(),
            scan_nr: 42,
            is_decoy: false,
            exp_mass: 1000.5,
            calc_mass: 1000.4,
            charge: 2,
            pre_aa: '-',
            post_aa: 'K',
            sequence: "PEPTIDE".into(),
            proteins: vec!["sp|P12345|PROT_HUMAN".into()],
            search_engine_features: BTreeMap::from([("xcorr".to_string(), 3.5)]),
        }
    }

    #[test]
    fn dot_notation_renders_terminal_dashes_as_brackets() {
        assert_eq!(psm().dot_notation(), "[.PEPTIDE.K");
    }

    #[test]
    fn psm_id_concatenates_file_scan_and_sequence() {
        assert_eq!(psm().psm_id(), "run1_scan42_PEPTIDE");
    }

    #[test]
    fn build_tsv_has_one_header_and_one_row_per_psm() {
        let builder = PinBuilder::new(2, 3, vec!["xcorr".to_string()]);
        let tsv = builder.build_tsv(&[psm()]).unwrap();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("SpecId\tLabel\tScanNr"));
        assert!(lines[0].ends_with("Peptide\tProteins"));
    }

    #[test]
    fn missing_extra_feature_is_an_error() {
        let builder = PinBuilder::new(2, 3, vec!["missing_feature".to_string()]);
        assert!(builder.build_tsv(&[psm()]).is_err());
    }
}
