//! NuXL fragment-adduct feasibility (C4, spec.md §4.5).
//!
//! Grounded on `examples/original_source/src/openms/source/ANALYSIS/NUXL/NuXLParameterParsing.cpp`'s
//! adduct-string parsing and pruning pipeline; the "chemically prune against
//! the precursor formula" step is implemented against the loss/gain formula
//! terms of the precursor adduct string itself (see DESIGN.md) since the
//! spec does not define a nucleotide-residue formula table to combine with
//! the bare letter prefix.

use std::collections::{HashMap, HashSet};

use msq_core::chemistry::MolecularFormula;
use msq_core::quantity::Mass;

use crate::error::{NuxlError, Result};
use crate::modification::ModificationRegistry;

/// Whether a marker ion applies to RNA, DNA, or both (supplemented feature 4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NucleicAcidAlphabet {
    /// RNA-only marker.
    Rna,
    /// DNA-only marker.
    Dna,
    /// Applies to either alphabet.
    Both,
}

/// One candidate fragment adduct a cross-linkable nucleotide letter may
/// contribute.
#[derive(Clone, Debug)]
pub struct FragmentAdductCandidate {
    /// Human-readable name, e.g. `"U-H2O"`.
    pub name: String,
    /// Empirical formula of the loss/gain this candidate represents.
    pub formula: MolecularFormula,
}

/// One emitted fragment adduct or marker ion.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentAdduct {
    /// Human-readable name.
    pub name: String,
    /// Empirical formula.
    pub formula: MolecularFormula,
    /// Monoisotopic mass.
    pub mass: Mass,
}

impl From<&FragmentAdductCandidate> for FragmentAdduct {
    fn from(c: &FragmentAdductCandidate) -> Self {
        Self {
            name: c.name.clone(),
            mass: c.formula.monoisotopic_mass(),
            formula: c.formula.clone(),
        }
    }
}

/// Per-nucleotide-letter candidate fragment adduct dictionary.
pub type FragmentAdductTable = HashMap<char, Vec<FragmentAdductCandidate>>;

/// The fixed default marker-ion list: unmodified nucleotide residues and
/// their base-loss variants (spec §4.5 step 6), each alphabet-tagged.
fn default_marker_ions() -> Vec<(NucleicAcidAlphabet, FragmentAdductCandidate)> {
    vec![
        (
            NucleicAcidAlphabet::Rna,
            FragmentAdductCandidate {
                name: "U".into(),
                formula: MolecularFormula::parse("C9H11N2O8P").unwrap_or_default(),
            },
        ),
        (
            NucleicAcidAlphabet::Rna,
            FragmentAdductCandidate {
                name: "U-H2O".into(),
                formula: MolecularFormula::parse("H2O").unwrap_or_default(),
            },
        ),
        (
            NucleicAcidAlphabet::Dna,
            FragmentAdductCandidate {
                name: "dT-H2O".into(),
                formula: MolecularFormula::parse("H2O").unwrap_or_default(),
            },
        ),
    ]
}

/// The output of [`feasible_adducts`]: the feasible fragment adducts and the
/// (deduplicated) marker ions for one precursor adduct string.
#[derive(Clone, Debug, Default)]
pub struct NuxlResult {
    /// Fragment adducts the MS2 spectrum may exhibit.
    pub feasible_adducts: Vec<FragmentAdduct>,
    /// Marker ions (deduplicated by formula, shortest name kept).
    pub marker_ions: Vec<FragmentAdduct>,
}

struct ParsedPrecursor {
    prefix: String,
    /// Net formula built from the `+`/`-` terms, used only for the monomer
    /// chemical-pruning step (see module docs).
    formula: MolecularFormula,
}

fn parse_precursor_adduct(s: &str) -> Result<ParsedPrecursor> {
    let split_at = s
        .char_indices()
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i);
    let Some(split_at) = split_at else {
        return Ok(ParsedPrecursor {
            prefix: s.to_string(),
            formula: MolecularFormula::new(),
        });
    };
    let prefix = s[..split_at].to_string();
    let mut formula = MolecularFormula::new();
    let mut rest = &s[split_at..];
    while !rest.is_empty() {
        let sign = &rest[..1];
        if sign != "+" && sign != "-" {
            return Err(NuxlError::ParseError(s.to_string()));
        }
        let term_len = rest[1..]
            .find(['+', '-'])
            .map(|i| i + 1)
            .unwrap_or(rest.len());
        let term = &rest[1..term_len];
        let term_formula = MolecularFormula::parse(term).ok_or_else(|| NuxlError::ParseError(s.to_string()))?;
        // Loss and gain terms are summed by magnitude: this crate prunes
        // candidates against "what the precursor string spends", not a
        // signed mass balance (see module docs).
        formula = formula + term_formula;
        rest = &rest[term_len..];
    }
    Ok(ParsedPrecursor { prefix, formula })
}

/// Implements §4.5 end to end: parse the precursor adduct string, restrict
/// to cross-linkable letters, branch on oligomer vs monomer precursors,
/// prune monomer candidates against the precursor formula, augment marker
/// ions with the fixed default list, deduplicate by formula, and register
/// every feasible adduct's name as an (idempotent) N-term/C-term
/// modification.
pub fn feasible_adducts(
    precursor_adduct: &str,
    candidates: &FragmentAdductTable,
    registry: &mut ModificationRegistry,
) -> Result<NuxlResult> {
    let parsed = parse_precursor_adduct(precursor_adduct)?;

    let mut cross_linkable: Vec<char> = parsed
        .prefix
        .chars()
        .filter(|c| candidates.contains_key(c))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    cross_linkable.sort_unstable();

    if cross_linkable.is_empty() {
        return Ok(NuxlResult::default());
    }

    let markers: Vec<char> = parsed
        .prefix
        .chars()
        .filter(|c| *c == 'd' || *c == 'r')
        .collect();
    if !markers.is_empty() {
        cross_linkable.retain(|c| markers.contains(c));
        if cross_linkable.is_empty() {
            return Ok(NuxlResult::default());
        }
    }

    let oligomer = parsed.prefix.chars().count() > 1;

    let mut feasible = Vec::new();
    let mut marker_ions = Vec::new();

    if oligomer {
        for letter in &cross_linkable {
            if let Some(letter_candidates) = candidates.get(letter) {
                feasible.extend(letter_candidates.iter().map(FragmentAdduct::from));
            }
        }
    } else {
        for letter in &cross_linkable {
            if let Some(letter_candidates) = candidates.get(letter) {
                for candidate in letter_candidates {
                    if parsed.formula.checked_sub(&candidate.formula).is_some() {
                        let fragment = FragmentAdduct::from(candidate);
                        feasible.push(fragment.clone());
                        marker_ions.push(fragment);
                    }
                }
            }
        }
    }

    for (_, candidate) in default_marker_ions() {
        marker_ions.push(FragmentAdduct::from(&candidate));
    }
    dedup_by_formula_keep_shortest_name(&mut marker_ions);

    for adduct in &feasible {
        registry.register(&adduct.name);
    }

    Ok(NuxlResult {
        feasible_adducts: feasible,
        marker_ions,
    })
}

fn dedup_by_formula_keep_shortest_name(ions: &mut Vec<FragmentAdduct>) {
    let mut by_formula: HashMap<String, FragmentAdduct> = HashMap::new();
    for ion in ions.drain(..) {
        let key = ion.formula.to_string();
        by_formula
            .entry(key)
            .and_modify(|kept| {
                if ion.name.len() < kept.name.len() {
                    *kept = ion.clone();
                }
            })
            .or_insert(ion);
    }
    ions.extend(by_formula.into_values());
    ions.sort_by(|a, b| a.name.cmp(&b.name));
}
