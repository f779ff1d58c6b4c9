//! Chemical elements and molecular formulas.
//!
//! Grounded on `mzcore::chemistry::{element, formula}`, trimmed to the subset
//! the NuXL fragment-adduct engine (`msq-nuxl`) and peak annotation code
//! actually need: elemental composition with signed counts, monoisotopic
//! mass, and checked subtraction (does this formula fit inside that one?).
//! The teacher's isotope-distribution, glycan-fragment and peptide-ambiguity
//! bookkeeping on `MolecularFormula` is not needed here and was left out
//! rather than carried over unused.

use std::collections::BTreeMap;
use std::fmt;

use crate::quantity::Mass;

/// The elements relevant to peptide, nucleic-acid, and small-adduct
/// chemistry. Monoisotopic masses are from CODATA/NIST tables.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum Element {
    /// Hydrogen (H), atomic number 1.
    #[default]
    H,
    /// Carbon (C), atomic number 6.
    C,
    /// Nitrogen (N), atomic number 7.
    N,
    /// Oxygen (O), atomic number 8.
    O,
    /// Sodium (Na), atomic number 11.
    Na,
    /// Phosphorus (P), atomic number 15.
    P,
    /// Sulphur (S), atomic number 16.
    S,
    /// Chlorine (Cl), atomic number 17.
    Cl,
    /// Potassium (K), atomic number 19.
    K,
}

impl Element {
    /// Monoisotopic mass of the most abundant natural isotope, in Daltons.
    #[must_use]
    pub const fn monoisotopic_mass(self) -> f64 {
        match self {
            Self::H => 1.007_825_032_23,
            Self::C => 12.0,
            Self::N => 14.003_074_004_43,
            Self::O => 15.994_914_619_57,
            Self::Na => 22.989_769_282_0,
            Self::P => 30.973_761_998_4,
            Self::S => 31.972_071_174_4,
            Self::Cl => 34.968_852_682,
            Self::K => 38.963_706_487,
        }
    }

    /// The one- or two-letter symbol used in Hill-notation formula strings.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::Na => "Na",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::K => "K",
        }
    }

    fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "H" => Some(Self::H),
            "C" => Some(Self::C),
            "N" => Some(Self::N),
            "O" => Some(Self::O),
            "Na" => Some(Self::Na),
            "P" => Some(Self::P),
            "S" => Some(Self::S),
            "Cl" => Some(Self::Cl),
            "K" => Some(Self::K),
            _ => None,
        }
    }
}

/// A molecular formula: a signed element → count map plus any additional
/// (already-monoisotopic) mass offset. Counts may be negative transiently
/// while building up a subtraction; a formula is only "feasible" once every
/// count is non-negative (see [`MolecularFormula::checked_sub`]).
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MolecularFormula {
    elements: BTreeMap<Element, i32>,
}

impl MolecularFormula {
    /// An empty formula (mass zero).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a formula from `(element, count)` pairs, dropping zero counts.
    #[must_use]
    pub fn from_counts(counts: impl IntoIterator<Item = (Element, i32)>) -> Self {
        let mut elements = BTreeMap::new();
        for (e, n) in counts {
            if n != 0 {
                *elements.entry(e).or_insert(0) += n;
            }
        }
        elements.retain(|_, n| *n != 0);
        Self { elements }
    }

    /// Parse a simple Hill-notation-like formula string such as `H2O` or
    /// `C10H15N2O9P`. Returns `None` on any unrecognized element symbol.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let mut elements = BTreeMap::new();
        let bytes = s.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let start = i;
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_lowercase() {
                i += 1;
            }
            let symbol = &s[start..i];
            let num_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let count: i32 = if num_start == i {
                1
            } else {
                s[num_start..i].parse().ok()?
            };
            let element = Element::from_symbol(symbol)?;
            *elements.entry(element).or_insert(0) += count;
        }
        Some(Self { elements })
    }

    /// Count of a single element (0 if absent).
    #[must_use]
    pub fn count(&self, element: Element) -> i32 {
        self.elements.get(&element).copied().unwrap_or(0)
    }

    /// Iterate over the non-zero `(element, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Element, i32)> + '_ {
        self.elements.iter().map(|(&e, &n)| (e, n))
    }

    /// Monoisotopic mass of this formula.
    #[must_use]
    pub fn monoisotopic_mass(&self) -> Mass {
        let mut mass = 0.0;
        for (element, count) in self.iter() {
            mass += element.monoisotopic_mass() * f64::from(count);
        }
        Mass(mass)
    }

    /// Subtract `other` from `self`, returning `None` if any resulting
    /// element count would go negative (i.e. `other` is not a subformula of
    /// `self`). This is the feasibility check used by the NuXL pruning step:
    /// a candidate fragment adduct survives only if it can be subtracted
    /// from the precursor formula without any element going negative.
    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        let mut result = self.elements.clone();
        for (element, count) in other.iter() {
            let entry = result.entry(element).or_insert(0);
            *entry -= count;
            if *entry < 0 {
                return None;
            }
        }
        result.retain(|_, n| *n != 0);
        Some(Self { elements: result })
    }

    /// `true` iff `other` is a subformula of `self` (every element count in
    /// `other` is `<=` the corresponding count in `self`).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.checked_sub(other).is_some()
    }
}

impl std::ops::Add for MolecularFormula {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let mut elements = self.elements;
        for (e, n) in rhs.elements {
            *elements.entry(e).or_insert(0) += n;
        }
        elements.retain(|_, n| *n != 0);
        Self { elements }
    }
}

impl fmt::Display for MolecularFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (element, count) in self.iter() {
            write!(f, "{}", element.symbol())?;
            if count != 1 {
                write!(f, "{count}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let water = MolecularFormula::parse("H2O").unwrap();
        assert_eq!(water.count(Element::H), 2);
        assert_eq!(water.count(Element::O), 1);
        assert_eq!(water.to_string(), "H2O");
    }

    #[test]
    fn checked_sub_rejects_negative_counts() {
        // S6: precursor "U-H2O" modeled directly as a formula; H2O is a
        // subformula of itself (feasible), a bigger fragment is not.
        let precursor = MolecularFormula::parse("H2O").unwrap();
        let small = MolecularFormula::parse("H2O").unwrap();
        assert!(precursor.checked_sub(&small).is_some());

        let too_big = MolecularFormula::parse("C10H15N2O9P").unwrap();
        assert!(precursor.checked_sub(&too_big).is_none());
    }

    #[test]
    fn monoisotopic_mass_of_water() {
        let water = MolecularFormula::parse("H2O").unwrap();
        assert!((water.monoisotopic_mass().value() - 18.0105646).abs() < 1e-4);
    }
}
