//! A process-wide modification registry (DESIGN NOTES §9: "isolate global
//! state behind a singleton-like handle"). Fragment-adduct names discovered
//! by [`crate::fragment_adduct::feasible_adducts`] are registered here as
//! both N-term and C-term modifications, idempotently.

use std::collections::HashSet;

/// A registry of modification names usable as N-terminal or C-terminal
/// peptide modifications.
#[derive(Debug, Default)]
pub struct ModificationRegistry {
    n_term: HashSet<String>,
    c_term: HashSet<String>,
}

impl ModificationRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as both an N-term and C-term modification. A repeat
    /// registration of the same name is a no-op.
    pub fn register(&mut self, name: &str) {
        self.n_term.insert(name.to_string());
        self.c_term.insert(name.to_string());
    }

    /// `true` iff `name` is registered as an N-term modification.
    #[must_use]
    pub fn has_n_term(&self, name: &str) -> bool {
        self.n_term.contains(name)
    }

    /// `true` iff `name` is registered as a C-term modification.
    #[must_use]
    pub fn has_c_term(&self, name: &str) -> bool {
        self.c_term.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        let mut registry = ModificationRegistry::new();
        registry.register("U-H2O");
        registry.register("U-H2O");
        assert!(registry.has_n_term("U-H2O"));
        assert!(registry.has_c_term("U-H2O"));
        assert_eq!(registry.n_term.len(), 1);
    }
}
