//! The Score/Parameter Registry (C1): a rooted tree of named nodes and typed,
//! restricted leaf entries.
//!
//! Grounded in spirit on `mzcore`'s tree-shaped metadata modules (ontology
//! trees, glycan structures) which all use the same "node holds children,
//! prune empty nodes upward" shape, generalized here to the parameter tree
//! described in spec.md §3.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A typed parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// A signed integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A string value.
    String(String),
    /// A list of integers.
    IntList(Vec<i64>),
    /// A list of floats.
    FloatList(Vec<f64>),
    /// A list of strings.
    StringList(Vec<String>),
}

/// A restriction narrowing the legal range of a [`ParamValue`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Restriction {
    /// Inclusive numeric bounds; either side may be unbounded.
    MinMax {
        /// Inclusive lower bound, if any.
        min: Option<f64>,
        /// Inclusive upper bound, if any.
        max: Option<f64>,
    },
    /// An allow-list of legal string values.
    Whitelist(Vec<String>),
}

impl Restriction {
    fn allows(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Self::MinMax { min, max }, ParamValue::Int(v)) => {
                let v = *v as f64;
                min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
            }
            (Self::MinMax { min, max }, ParamValue::Float(v)) => {
                min.map_or(true, |m| *v >= m) && max.map_or(true, |m| *v <= m)
            }
            (Self::MinMax { min, max }, ParamValue::IntList(vs)) => vs.iter().all(|v| {
                let v = *v as f64;
                min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m)
            }),
            (Self::MinMax { min, max }, ParamValue::FloatList(vs)) => vs
                .iter()
                .all(|v| min.map_or(true, |m| *v >= m) && max.map_or(true, |m| *v <= m)),
            (Self::Whitelist(allowed), ParamValue::String(v)) => allowed.contains(v),
            (Self::Whitelist(allowed), ParamValue::StringList(vs)) => {
                vs.iter().all(|v| allowed.contains(v))
            }
            _ => true, // a restriction of the wrong shape for this value never applies
        }
    }
}

/// A single leaf entry in a [`ParamTree`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamEntry {
    value: ParamValue,
    /// Human-readable description. May contain embedded newlines.
    pub description: String,
    /// Free-form tags (no entry may carry a tag containing a comma).
    pub tags: Vec<String>,
    /// An optional restriction on `value`.
    pub restriction: Option<Restriction>,
}

impl ParamEntry {
    /// Create a new entry, validating the value against its restriction (if
    /// any) up front.
    pub fn new(
        value: ParamValue,
        description: impl Into<String>,
        tags: Vec<String>,
        restriction: Option<Restriction>,
    ) -> Result<Self> {
        for tag in &tags {
            if tag.contains(',') {
                return Err(CoreError::InvalidValue(format!(
                    "tag `{tag}` may not contain a comma"
                )));
            }
        }
        if let Some(r) = &restriction {
            if !r.allows(&value) {
                return Err(CoreError::InvalidParameter {
                    name: String::new(),
                    reason: "value violates restriction".into(),
                });
            }
        }
        Ok(Self {
            value,
            description: description.into(),
            tags,
            restriction,
        })
    }

    /// The current value.
    #[must_use]
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Replace the value, re-checking the restriction.
    pub fn set_value(&mut self, value: ParamValue) -> Result<()> {
        if let Some(r) = &self.restriction {
            if !r.allows(&value) {
                return Err(CoreError::InvalidParameter {
                    name: String::new(),
                    reason: "value violates restriction".into(),
                });
            }
        }
        self.value = value;
        Ok(())
    }

    /// `true` iff the current value still satisfies the restriction (a
    /// restriction can become stale if tightened after the fact).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.restriction.as_ref().map_or(true, |r| r.allows(&self.value))
    }
}

/// One node of a [`ParamTree`]: entries and child nodes keyed by local name.
/// Local names may not contain `:`, since `:` is the path separator.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParamNode {
    entries: BTreeMap<String, ParamEntry>,
    children: BTreeMap<String, ParamNode>,
}

fn validate_name(name: &str) -> Result<()> {
    if name.contains(':') {
        return Err(CoreError::InvalidValue(format!(
            "parameter name `{name}` may not contain ':'"
        )));
    }
    Ok(())
}

impl ParamNode {
    /// `true` iff this node has neither entries nor non-empty children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.children.values().all(ParamNode::is_empty)
    }

    fn prune_empty_children(&mut self) {
        self.children.retain(|_, child| {
            child.prune_empty_children();
            !child.is_empty()
        });
    }
}

/// A rooted parameter tree, addressed by `:`-separated dotted paths such as
/// `mrm:picker:stop_after_feature`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParamTree {
    root: ParamNode,
}

impl ParamTree {
    /// An empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn split(path: &str) -> Vec<&str> {
        path.split(':').filter(|s| !s.is_empty()).collect()
    }

    /// Insert or replace the entry at `path`, creating intermediate nodes as
    /// needed. Each path segment is validated (no `:`, which is guaranteed by
    /// construction since `:` is the separator, but segment emptiness and
    /// embedded separators in a single caller-supplied segment are still
    /// checked).
    pub fn set(&mut self, path: &str, entry: ParamEntry) -> Result<()> {
        let segments = Self::split(path);
        if segments.is_empty() {
            return Err(CoreError::InvalidValue("empty parameter path".into()));
        }
        for segment in &segments {
            validate_name(segment)?;
        }
        let mut node = &mut self.root;
        for segment in &segments[..segments.len() - 1] {
            node = node
                .children
                .entry((*segment).to_string())
                .or_insert_with(ParamNode::default);
        }
        node.entries
            .insert(segments[segments.len() - 1].to_string(), entry);
        Ok(())
    }

    /// Look up the entry at `path`.
    pub fn get(&self, path: &str) -> Result<&ParamEntry> {
        let segments = Self::split(path);
        let mut node = &self.root;
        for segment in &segments[..segments.len().saturating_sub(1)] {
            node = node
                .children
                .get(*segment)
                .ok_or_else(|| CoreError::ElementNotFound(path.to_string()))?;
        }
        segments
            .last()
            .and_then(|last| node.entries.get(*last))
            .ok_or_else(|| CoreError::ElementNotFound(path.to_string()))
    }

    /// Look up the entry at `path` mutably.
    pub fn get_mut(&mut self, path: &str) -> Result<&mut ParamEntry> {
        let segments = Self::split(path);
        let mut node = &mut self.root;
        for segment in &segments[..segments.len().saturating_sub(1)] {
            node = node
                .children
                .get_mut(*segment)
                .ok_or_else(|| CoreError::ElementNotFound(path.to_string()))?;
        }
        let path_owned = path.to_string();
        segments
            .last()
            .and_then(move |last| node.entries.get_mut(*last))
            .ok_or(CoreError::ElementNotFound(path_owned))
    }

    /// Remove the entry at `path`, pruning any node left empty by the
    /// removal (and its now-empty ancestors, up to the root).
    pub fn remove(&mut self, path: &str) -> Result<ParamEntry> {
        let segments = Self::split(path);
        if segments.is_empty() {
            return Err(CoreError::ElementNotFound(path.to_string()));
        }
        let removed = Self::remove_rec(&mut self.root, &segments)
            .ok_or_else(|| CoreError::ElementNotFound(path.to_string()))?;
        self.root.prune_empty_children();
        Ok(removed)
    }

    fn remove_rec(node: &mut ParamNode, segments: &[&str]) -> Option<ParamEntry> {
        if segments.len() == 1 {
            return node.entries.remove(segments[0]);
        }
        let child = node.children.get_mut(segments[0])?;
        Self::remove_rec(child, &segments[1..])
    }

    /// Serialize to TOML. This is an ambient convenience (see SPEC_FULL.md);
    /// it is independent of the Param-XML wire format spec.md names as an
    /// external collaborator codec.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::ParseError(e.to_string()))
    }

    /// Deserialize from TOML produced by [`ParamTree::to_toml`].
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CoreError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_entry(v: i64) -> ParamEntry {
        ParamEntry::new(ParamValue::Int(v), "a value", vec![], None).unwrap()
    }

    #[test]
    fn rejects_colon_in_name() {
        let mut tree = ParamTree::new();
        // `:` in a path is just the separator between segments, so this is a
        // perfectly valid three-level path.
        assert!(tree.set("bad:name:leaf", int_entry(1)).is_ok());
        // A single segment itself containing ':' is what the invariant
        // actually forbids; `set`'s own splitting can never produce one, so
        // the lower-level guard is exercised directly.
        assert!(validate_name("bad:name").is_err());
    }

    #[test]
    fn restriction_violation_makes_entry_invalid() {
        let mut tree = ParamTree::new();
        let entry = ParamEntry::new(
            ParamValue::Int(5),
            "stop after N features",
            vec![],
            Some(Restriction::MinMax {
                min: Some(0.0),
                max: Some(10.0),
            }),
        )
        .unwrap();
        tree.set("mrm:stop_after_feature", entry).unwrap();
        let e = tree.get_mut("mrm:stop_after_feature").unwrap();
        // Bypass the setter's own check to simulate a restriction tightened
        // after the fact, then confirm `is_valid` reflects the violation.
        e.restriction = Some(Restriction::MinMax {
            min: Some(0.0),
            max: Some(1.0),
        });
        assert!(!e.is_valid());
    }

    #[test]
    fn nodes_prune_upward_when_emptied() {
        let mut tree = ParamTree::new();
        tree.set("mrm:picker:stop_after_feature", int_entry(5))
            .unwrap();
        tree.remove("mrm:picker:stop_after_feature").unwrap();
        assert!(tree.root.is_empty());
    }

    #[test]
    fn toml_round_trip_is_lossless_for_values() {
        let mut tree = ParamTree::new();
        tree.set(
            "mrm:stop_after_feature",
            ParamEntry::new(
                ParamValue::IntList(vec![1, 2, 3]),
                "a description\nwith an embedded newline",
                vec!["advanced".into()],
                None,
            )
            .unwrap(),
        )
        .unwrap();
        let s = tree.to_toml().unwrap();
        let restored = ParamTree::from_toml(&s).unwrap();
        assert_eq!(
            restored.get("mrm:stop_after_feature").unwrap().value(),
            tree.get("mrm:stop_after_feature").unwrap().value()
        );
        assert_eq!(
            restored.get("mrm:stop_after_feature").unwrap().description,
            "a description\nwith an embedded newline"
        );
    }
}
