//! The Identification Data Store (C2, spec.md §4.4): a normalized,
//! reference-checked arena of identification entities.
//!
//! Grounded on `examples/original_source/src/openms/source/METADATA/ID/IdentificationData.cpp`
//! for the operation set and invariants (register*/addScore/merge/cleanup/
//! calculateCoverages/getBestMatchPerObservation), reshaped per DESIGN NOTES
//! §9 into an arena of vector-backed tables keyed by [`Id`] rather than the
//! original's pointer-based cross-reference sets.

use std::collections::HashMap;

use log::warn;

use crate::entities::{
    Adduct, AppliedProcessingSteps, DbSearchParam, IdentifiedMolecule, InputFile, MoleculeRef,
    Observation, ObservationMatch, ObservationMatchGroup, ParentMatch, ParentSequence,
    ParentSequenceGroup, ProcessingSoftware, ProcessingStep, ScoreMap, ScoreType,
};
use crate::error::{IdentError, Result};
use crate::id::{Arena, Id};

/// Which garbage-collection sweeps [`IdentificationStore::cleanup`] performs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupFlags {
    /// Drop identified molecules with no referencing observation match.
    pub require_observation_match: bool,
    /// Drop parent sequences with no referencing identified molecule.
    pub require_identified_sequence: bool,
    /// Drop identified molecules with no parent matches.
    pub require_parent_match: bool,
    /// Drop groups left with no members, and prune dangling member refs.
    pub require_group: bool,
}

/// Maps every old [`Id`] to its corresponding new `Id` after a [`IdentificationStore::merge`].
#[derive(Default)]
pub struct RefTranslator {
    input_files: HashMap<Id<InputFile>, Id<InputFile>>,
    software: HashMap<Id<ProcessingSoftware>, Id<ProcessingSoftware>>,
    search_params: HashMap<Id<DbSearchParam>, Id<DbSearchParam>>,
    score_types: HashMap<Id<ScoreType>, Id<ScoreType>>,
    steps: HashMap<Id<ProcessingStep>, Id<ProcessingStep>>,
    observations: HashMap<Id<Observation>, Id<Observation>>,
    parents: HashMap<Id<ParentSequence>, Id<ParentSequence>>,
    molecules: HashMap<Id<IdentifiedMolecule>, Id<IdentifiedMolecule>>,
    adducts: HashMap<Id<Adduct>, Id<Adduct>>,
    matches: HashMap<Id<ObservationMatch>, Id<ObservationMatch>>,
    parent_groups: HashMap<Id<ParentSequenceGroup>, Id<ParentSequenceGroup>>,
    match_groups: HashMap<Id<ObservationMatchGroup>, Id<ObservationMatchGroup>>,
}

impl RefTranslator {
    /// Translate an [`Id<InputFile>`] produced by the merged-from store.
    pub fn input_file(&self, old: Id<InputFile>) -> Option<Id<InputFile>> {
        self.input_files.get(&old).copied()
    }

    /// Translate an [`Id<Observation>`] produced by the merged-from store.
    pub fn observation(&self, old: Id<Observation>) -> Option<Id<Observation>> {
        self.observations.get(&old).copied()
    }

    /// Translate an [`Id<ObservationMatch>`] produced by the merged-from store.
    pub fn observation_match(&self, old: Id<ObservationMatch>) -> Option<Id<ObservationMatch>> {
        self.matches.get(&old).copied()
    }

    /// Translate an [`Id<ParentSequence>`] produced by the merged-from store.
    pub fn parent_sequence(&self, old: Id<ParentSequence>) -> Option<Id<ParentSequence>> {
        self.parents.get(&old).copied()
    }
}

/// The normalized identification data store.
#[derive(Default)]
pub struct IdentificationStore {
    input_files: Arena<InputFile>,
    software: Arena<ProcessingSoftware>,
    search_params: Arena<DbSearchParam>,
    score_types: Arena<ScoreType>,
    steps: Arena<ProcessingStep>,
    observations: Arena<Observation>,
    parents: Arena<ParentSequence>,
    molecules: Arena<IdentifiedMolecule>,
    adducts: Arena<Adduct>,
    matches: Arena<ObservationMatch>,
    parent_groups: Arena<ParentSequenceGroup>,
    match_groups: Arena<ObservationMatchGroup>,

    /// `true` while a `merge` is in progress: embedded-ref validation is
    /// skipped since the translator already guarantees consistency.
    no_checks: bool,
    current_step: Option<Id<ProcessingStep>>,
}

impl IdentificationStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries registered after this call automatically inherit `step` in
    /// their processing-step history, unless they already reference it.
    pub fn set_current_processing_step(&mut self, step: Id<ProcessingStep>) {
        self.current_step = Some(step);
    }

    /// Stop auto-inheriting a current processing step.
    pub fn clear_current_processing_step(&mut self) {
        self.current_step = None;
    }

    pub fn register_input_file(&mut self, file: InputFile) -> Id<InputFile> {
        self.input_files.insert(file)
    }

    pub fn register_processing_software(
        &mut self,
        software: ProcessingSoftware,
    ) -> Id<ProcessingSoftware> {
        self.software.insert(software)
    }

    pub fn register_db_search_param(&mut self, param: DbSearchParam) -> Id<DbSearchParam> {
        self.search_params.insert(param)
    }

    /// Register a score type. Fails if a score type of the same name was
    /// already registered with a conflicting `higher_better` orientation.
    pub fn register_score_type(&mut self, score_type: ScoreType) -> Result<Id<ScoreType>> {
        for (id, existing) in self.score_types.iter() {
            if existing.name == score_type.name {
                if existing.higher_better != score_type.higher_better {
                    return Err(IdentError::ConflictingScoreOrientation {
                        name: score_type.name,
                    });
                }
                return Ok(id);
            }
        }
        Ok(self.score_types.insert(score_type))
    }

    /// Register a processing step, validating its software and input-file
    /// references (and search-param reference, if given).
    pub fn register_processing_step(&mut self, step: ProcessingStep) -> Result<Id<ProcessingStep>> {
        if !self.no_checks {
            if !self.software.contains(step.software) {
                return Err(IdentError::IllegalArgument {
                    kind: "ProcessingSoftware",
                });
            }
            for input in &step.input_files {
                if !self.input_files.contains(*input) {
                    return Err(IdentError::IllegalArgument { kind: "InputFile" });
                }
            }
            if let Some(param) = step.search_param {
                if !self.search_params.contains(param) {
                    return Err(IdentError::IllegalArgument {
                        kind: "DbSearchParam",
                    });
                }
            }
        }
        Ok(self.steps.insert(step))
    }

    /// Register an observation. Fails if `data_id` is empty or `input_file`
    /// does not exist.
    pub fn register_observation(
        &mut self,
        data_id: impl Into<String>,
        input_file: Id<InputFile>,
    ) -> Result<Id<Observation>> {
        let data_id = data_id.into();
        if data_id.is_empty() {
            return Err(IdentError::InvalidValue(
                "observation data_id must not be empty".into(),
            ));
        }
        if !self.no_checks && !self.input_files.contains(input_file) {
            return Err(IdentError::IllegalArgument { kind: "InputFile" });
        }
        Ok(self.observations.insert(Observation {
            data_id,
            input_file,
            meta: HashMap::new(),
        }))
    }

    pub fn register_parent_sequence(
        &mut self,
        mut parent: ParentSequence,
    ) -> Result<Id<ParentSequence>> {
        if !(0.0..=1.0).contains(&parent.coverage) {
            return Err(IdentError::InvalidValue(format!(
                "coverage {} outside [0, 1]",
                parent.coverage
            )));
        }
        Self::inherit_current(&mut parent.applied_processing_steps, self.current_step);
        Ok(self.parents.insert(parent))
    }

    fn inherit_current(
        history: &mut AppliedProcessingSteps,
        current: Option<Id<ProcessingStep>>,
    ) {
        if let Some(step) = current {
            if !history.already_current(step) {
                history.steps.push((step, ScoreMap::new()));
            }
        }
    }

    fn register_identified_molecule(
        &mut self,
        mut molecule: IdentifiedMolecule,
    ) -> Result<Id<IdentifiedMolecule>> {
        if !self.no_checks {
            for pm in &molecule.parent_matches {
                if !self.parents.contains(pm.parent) {
                    return Err(IdentError::IllegalArgument {
                        kind: "ParentSequence",
                    });
                }
            }
        }
        Self::inherit_current(&mut molecule.applied_processing_steps, self.current_step);
        Ok(self.molecules.insert(molecule))
    }

    /// Register an identified peptide. Peptides, compounds, and
    /// oligonucleotides share the same [`IdentifiedMolecule`] shape; which
    /// table a [`MoleculeRef`] variant points into is only meaningful at the
    /// call site, since all three are stored in one arena.
    pub fn register_identified_peptide(
        &mut self,
        molecule: IdentifiedMolecule,
    ) -> Result<Id<IdentifiedMolecule>> {
        self.register_identified_molecule(molecule)
    }

    /// Register an identified small-molecule compound.
    pub fn register_identified_compound(
        &mut self,
        molecule: IdentifiedMolecule,
    ) -> Result<Id<IdentifiedMolecule>> {
        self.register_identified_molecule(molecule)
    }

    /// Register an identified oligonucleotide.
    pub fn register_identified_oligo(
        &mut self,
        molecule: IdentifiedMolecule,
    ) -> Result<Id<IdentifiedMolecule>> {
        self.register_identified_molecule(molecule)
    }

    pub fn register_adduct(&mut self, adduct: Adduct) -> Id<Adduct> {
        self.adducts.insert(adduct)
    }

    /// Register an observation match, validating the molecule, observation,
    /// and adduct references.
    pub fn register_observation_match(
        &mut self,
        mut m: ObservationMatch,
    ) -> Result<Id<ObservationMatch>> {
        if !self.no_checks {
            let molecule_id = match m.molecule {
                MoleculeRef::Peptide(id) | MoleculeRef::Compound(id) | MoleculeRef::Oligo(id) => {
                    id
                }
            };
            if !self.molecules.contains(molecule_id) {
                return Err(IdentError::IllegalArgument {
                    kind: "IdentifiedMolecule",
                });
            }
            if !self.observations.contains(m.observation) {
                return Err(IdentError::IllegalArgument { kind: "Observation" });
            }
            if let Some(adduct) = m.adduct {
                if !self.adducts.contains(adduct) {
                    return Err(IdentError::IllegalArgument { kind: "Adduct" });
                }
            }
        }
        Self::inherit_current(&mut m.applied_processing_steps, self.current_step);
        Ok(self.matches.insert(m))
    }

    /// Register a parent-sequence group, validating member references.
    pub fn register_parent_group_set(
        &mut self,
        group: ParentSequenceGroup,
    ) -> Result<Id<ParentSequenceGroup>> {
        if !self.no_checks {
            for member in &group.members {
                if !self.parents.contains(*member) {
                    return Err(IdentError::IllegalArgument {
                        kind: "ParentSequence",
                    });
                }
            }
        }
        Ok(self.parent_groups.insert(group))
    }

    /// Register an observation-match group, validating member references.
    pub fn register_observation_match_group(
        &mut self,
        group: ObservationMatchGroup,
    ) -> Result<Id<ObservationMatchGroup>> {
        if !self.no_checks {
            for member in &group.members {
                if !self.matches.contains(*member) {
                    return Err(IdentError::IllegalArgument {
                        kind: "ObservationMatch",
                    });
                }
            }
        }
        Ok(self.match_groups.insert(group))
    }

    /// Append a score to `m`'s most recent processing step.
    pub fn add_score(
        &mut self,
        m: Id<ObservationMatch>,
        score_type: Id<ScoreType>,
        value: f64,
    ) -> Result<()> {
        if !self.no_checks && !self.score_types.contains(score_type) {
            return Err(IdentError::IllegalArgument { kind: "ScoreType" });
        }
        let m = self
            .matches
            .get_mut(m)
            .ok_or(IdentError::IllegalArgument {
                kind: "ObservationMatch",
            })?;
        let (_, scores) = m
            .applied_processing_steps
            .steps
            .last_mut()
            .ok_or_else(|| {
                IdentError::MissingInformation(
                    "observation match has no processing step to attach a score to".into(),
                )
            })?;
        scores.insert(score_type, value);
        Ok(())
    }

    /// For each parent sequence, union the `[start, end]` intervals of
    /// matches referencing it across all identified molecules and set
    /// `coverage = union_length / sequence.len()`.
    ///
    /// When `check_length` is set, a match whose `end` exceeds the parent
    /// sequence's length is treated as invalid (skipped, with a warning)
    /// rather than silently clamped.
    pub fn calculate_coverages(&mut self, check_length: bool) {
        let mut intervals: HashMap<Id<ParentSequence>, Vec<(usize, usize)>> = HashMap::new();
        for (_, molecule) in self.molecules.iter() {
            for pm in &molecule.parent_matches {
                intervals.entry(pm.parent).or_default().push((pm.start, pm.end));
            }
        }
        for (id, parent) in self.parents.iter_mut() {
            let len = parent.sequence.len();
            let mut ranges = intervals.remove(&id).unwrap_or_default();
            if check_length {
                let before = ranges.len();
                ranges.retain(|&(_, end)| len == 0 || end < len);
                if ranges.len() != before {
                    warn!("calculateCoverages: dropped out-of-bounds match(es) on parent `{}`", parent.accession);
                }
            }
            parent.coverage = if len == 0 {
                0.0
            } else {
                union_length(&mut ranges) as f64 / len as f64
            };
        }
    }

    /// Group observation matches by observation (in observation-id order,
    /// approximating registration order) and return, per observation, the
    /// match id with the best score of `score` according to its orientation.
    ///
    /// If `require_score` is set, matches lacking `score` are skipped
    /// entirely; an observation whose matches all lack it is omitted.
    pub fn get_best_match_per_observation(
        &self,
        score: Id<ScoreType>,
        require_score: bool,
    ) -> Result<HashMap<Id<Observation>, Id<ObservationMatch>>> {
        let orientation = self
            .score_types
            .get(score)
            .ok_or(IdentError::IllegalArgument { kind: "ScoreType" })?
            .higher_better;

        let mut best: HashMap<Id<Observation>, (Id<ObservationMatch>, f64)> = HashMap::new();
        for (match_id, m) in self.matches.iter() {
            let current_score = m
                .applied_processing_steps
                .steps
                .iter()
                .rev()
                .find_map(|(_, scores)| scores.get(&score).copied());
            let value = match (current_score, require_score) {
                (Some(v), _) => v,
                (None, true) => continue,
                (None, false) => f64::NEG_INFINITY,
            };
            best.entry(m.observation)
                .and_modify(|(best_id, best_value)| {
                    let better = if orientation {
                        value > *best_value
                    } else {
                        value < *best_value
                    };
                    if better {
                        *best_id = match_id;
                        *best_value = value;
                    }
                })
                .or_insert((match_id, value));
        }
        Ok(best.into_iter().map(|(obs, (m, _))| (obs, m)).collect())
    }

    /// Garbage-collect entities orphaned by filter operations.
    pub fn cleanup(&mut self, flags: CleanupFlags) {
        if flags.require_observation_match {
            let referenced: std::collections::HashSet<Id<IdentifiedMolecule>> = self
                .matches
                .iter()
                .map(|(_, m)| match m.molecule {
                    MoleculeRef::Peptide(id) | MoleculeRef::Compound(id) | MoleculeRef::Oligo(id) => id,
                })
                .collect();
            let orphans: Vec<_> = self
                .molecules
                .iter()
                .filter(|(id, _)| !referenced.contains(id))
                .map(|(id, _)| id)
                .collect();
            for id in orphans {
                self.molecules.remove(id);
            }
        }

        if flags.require_parent_match {
            let orphans: Vec<_> = self
                .molecules
                .iter()
                .filter(|(_, m)| m.parent_matches.is_empty())
                .map(|(id, _)| id)
                .collect();
            for id in orphans {
                self.molecules.remove(id);
            }
        }

        if flags.require_identified_sequence {
            let referenced: std::collections::HashSet<Id<ParentSequence>> = self
                .molecules
                .iter()
                .flat_map(|(_, m)| m.parent_matches.iter().map(|pm| pm.parent))
                .collect();
            let orphans: Vec<_> = self
                .parents
                .iter()
                .filter(|(id, _)| !referenced.contains(id))
                .map(|(id, _)| id)
                .collect();
            for id in orphans {
                self.parents.remove(id);
            }
        }

        if flags.require_group {
            for (_, group) in self.parent_groups.iter_mut() {
                let before = group.members.len();
                group.members.retain(|m| self.parents.contains(*m));
                if group.members.len() != before {
                    warn!("cleanup: parent group scores may be invalid after member pruning");
                }
            }
            let empty: Vec<_> = self
                .parent_groups
                .iter()
                .filter(|(_, g)| g.members.is_empty())
                .map(|(id, _)| id)
                .collect();
            for id in empty {
                self.parent_groups.remove(id);
            }

            for (_, group) in self.match_groups.iter_mut() {
                let before = group.members.len();
                group.members.retain(|m| self.matches.contains(*m));
                if group.members.len() != before {
                    warn!("cleanup: observation-match group scores may be invalid after member pruning");
                }
            }
            let empty: Vec<_> = self
                .match_groups
                .iter()
                .filter(|(_, g)| g.members.is_empty())
                .map(|(id, _)| id)
                .collect();
            for id in empty {
                self.match_groups.remove(id);
            }
        }
    }

    /// Copy every entity from `other` into `self`, rewriting embedded
    /// references via the returned translator. `self.no_checks` is set for
    /// the duration so validation is skipped (the translator already
    /// guarantees referential consistency).
    pub fn merge(&mut self, other: &Self) -> RefTranslator {
        self.no_checks = true;
        let mut t = RefTranslator::default();

        for (old, file) in other.input_files.iter() {
            let new = self.register_input_file(file.clone());
            t.input_files.insert(old, new);
        }
        for (old, sw) in other.software.iter() {
            let new = self.register_processing_software(sw.clone());
            t.software.insert(old, new);
        }
        for (old, p) in other.search_params.iter() {
            let new = self.register_db_search_param(p.clone());
            t.search_params.insert(old, new);
        }
        for (old, st) in other.score_types.iter() {
            let new = self
                .register_score_type(st.clone())
                .expect("merge never fails validation (no_checks)");
            t.score_types.insert(old, new);
        }
        for (old, step) in other.steps.iter() {
            let translated = ProcessingStep {
                software: t.software[&step.software],
                input_files: step
                    .input_files
                    .iter()
                    .map(|id| t.input_files[id])
                    .collect(),
                search_param: step.search_param.map(|id| t.search_params[&id]),
            };
            let new = self
                .register_processing_step(translated)
                .expect("merge never fails validation (no_checks)");
            t.steps.insert(old, new);
        }
        for (old, obs) in other.observations.iter() {
            let new = self
                .register_observation(obs.data_id.clone(), t.input_files[&obs.input_file])
                .expect("merge never fails validation (no_checks)");
            t.observations.insert(old, new);
        }
        for (old, parent) in other.parents.iter() {
            let mut translated = parent.clone();
            translate_history(&mut translated.applied_processing_steps, &t.steps, &t.score_types);
            let new = self
                .register_parent_sequence(translated)
                .expect("merge never fails validation (no_checks)");
            t.parents.insert(old, new);
        }
        for (old, molecule) in other.molecules.iter() {
            let mut translated = molecule.clone();
            translated.parent_matches = molecule
                .parent_matches
                .iter()
                .map(|pm| ParentMatch {
                    parent: t.parents[&pm.parent],
                    start: pm.start,
                    end: pm.end,
                })
                .collect();
            translate_history(&mut translated.applied_processing_steps, &t.steps, &t.score_types);
            let new = self
                .register_identified_molecule(translated)
                .expect("merge never fails validation (no_checks)");
            t.molecules.insert(old, new);
        }
        for (old, adduct) in other.adducts.iter() {
            let new = self.register_adduct(adduct.clone());
            t.adducts.insert(old, new);
        }
        for (old, m) in other.matches.iter() {
            let mut translated = m.clone();
            translated.molecule = match m.molecule {
                MoleculeRef::Peptide(id) => MoleculeRef::Peptide(t.molecules[&id]),
                MoleculeRef::Compound(id) => MoleculeRef::Compound(t.molecules[&id]),
                MoleculeRef::Oligo(id) => MoleculeRef::Oligo(t.molecules[&id]),
            };
            translated.observation = t.observations[&m.observation];
            translated.adduct = m.adduct.map(|id| t.adducts[&id]);
            translate_history(&mut translated.applied_processing_steps, &t.steps, &t.score_types);
            let new = self
                .register_observation_match(translated)
                .expect("merge never fails validation (no_checks)");
            t.matches.insert(old, new);
        }
        for (old, group) in other.parent_groups.iter() {
            let translated = ParentSequenceGroup {
                members: group.members.iter().map(|id| t.parents[id]).collect(),
                applied_processing_steps: {
                    let mut h = group.applied_processing_steps.clone();
                    translate_history(&mut h, &t.steps, &t.score_types);
                    h
                },
            };
            let new = self
                .register_parent_group_set(translated)
                .expect("merge never fails validation (no_checks)");
            t.parent_groups.insert(old, new);
        }
        for (old, group) in other.match_groups.iter() {
            let translated = ObservationMatchGroup {
                members: group.members.iter().map(|id| t.matches[id]).collect(),
                applied_processing_steps: {
                    let mut h = group.applied_processing_steps.clone();
                    translate_history(&mut h, &t.steps, &t.score_types);
                    h
                },
            };
            let new = self
                .register_observation_match_group(translated)
                .expect("merge never fails validation (no_checks)");
            t.match_groups.insert(old, new);
        }

        self.no_checks = false;
        t
    }

    /// Swap the contents of two stores in constant time (supplemented
    /// feature 2).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Reset this store to empty (supplemented feature 2).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of (non-removed) entities of each kind, used by tests to
    /// check merge idempotence (spec §8 property 5).
    pub fn entity_counts(&self) -> EntityCounts {
        EntityCounts {
            input_files: self.input_files.len(),
            software: self.software.len(),
            search_params: self.search_params.len(),
            score_types: self.score_types.len(),
            steps: self.steps.len(),
            observations: self.observations.len(),
            parents: self.parents.len(),
            molecules: self.molecules.len(),
            adducts: self.adducts.len(),
            matches: self.matches.len(),
            parent_groups: self.parent_groups.len(),
            match_groups: self.match_groups.len(),
        }
    }

    pub fn parent_sequence(&self, id: Id<ParentSequence>) -> Option<&ParentSequence> {
        self.parents.get(id)
    }

    pub fn observation_match(&self, id: Id<ObservationMatch>) -> Option<&ObservationMatch> {
        self.matches.get(id)
    }
}

fn translate_history(
    history: &mut AppliedProcessingSteps,
    steps: &HashMap<Id<ProcessingStep>, Id<ProcessingStep>>,
    score_types: &HashMap<Id<ScoreType>, Id<ScoreType>>,
) {
    for (step, scores) in &mut history.steps {
        *step = steps[step];
        *scores = scores
            .drain()
            .map(|(score_type, value)| (score_types[&score_type], value))
            .collect();
    }
}

/// Total length covered by a set of (inclusive) `[start, end]` intervals,
/// after merging overlaps. Sorts `intervals` in place.
fn union_length(intervals: &mut [(usize, usize)]) -> usize {
    if intervals.is_empty() {
        return 0;
    }
    intervals.sort_by_key(|&(start, _)| start);
    let mut total = 0usize;
    let (mut cur_start, mut cur_end) = intervals[0];
    for &(start, end) in &intervals[1..] {
        if start > cur_end + 1 {
            total += cur_end - cur_start + 1;
            cur_start = start;
            cur_end = end;
        } else {
            cur_end = cur_end.max(end);
        }
    }
    total += cur_end - cur_start + 1;
    total
}

/// A snapshot of per-table entity counts, used for merge-idempotence tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityCounts {
    pub input_files: usize,
    pub software: usize,
    pub search_params: usize,
    pub score_types: usize,
    pub steps: usize,
    pub observations: usize,
    pub parents: usize,
    pub molecules: usize,
    pub adducts: usize,
    pub matches: usize,
    pub parent_groups: usize,
    pub match_groups: usize,
}

impl std::ops::Mul<usize> for EntityCounts {
    type Output = EntityCounts;
    fn mul(self, rhs: usize) -> EntityCounts {
        EntityCounts {
            input_files: self.input_files * rhs,
            software: self.software * rhs,
            search_params: self.search_params * rhs,
            score_types: self.score_types * rhs,
            steps: self.steps * rhs,
            observations: self.observations * rhs,
            parents: self.parents * rhs,
            molecules: self.molecules * rhs,
            adducts: self.adducts * rhs,
            matches: self.matches * rhs,
            parent_groups: self.parent_groups * rhs,
            match_groups: self.match_groups * rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> IdentificationStore {
        let mut store = IdentificationStore::new();
        let file = store.register_input_file(InputFile {
            name: "run1.mzML".into(),
            experimental_design: None,
        });
        let parent = store
            .register_parent_sequence(ParentSequence {
                accession: "P1".into(),
                molecule_type: crate::entities::MoleculeType::Protein,
                sequence: "PEPTIDESEQUENCE".into(),
                coverage: 0.0,
                decoy: false,
                applied_processing_steps: AppliedProcessingSteps::default(),
            })
            .unwrap();
        let peptide = store
            .register_identified_peptide(IdentifiedMolecule {
                identity: "PEPTIDE".into(),
                parent_matches: vec![ParentMatch {
                    parent,
                    start: 0,
                    end: 6,
                }],
                applied_processing_steps: AppliedProcessingSteps::default(),
                meta: HashMap::new(),
            })
            .unwrap();
        let obs = store.register_observation("scan=1", file).unwrap();
        store
            .register_observation_match(ObservationMatch {
                molecule: MoleculeRef::Peptide(peptide),
                observation: obs,
                charge: 2,
                adduct: None,
                peak_annotations: vec![],
                applied_processing_steps: AppliedProcessingSteps::default(),
                meta: HashMap::new(),
            })
            .unwrap();
        store
    }

    #[test]
    fn registering_observation_with_empty_data_id_fails() {
        let mut store = IdentificationStore::new();
        let file = store.register_input_file(InputFile {
            name: "a".into(),
            experimental_design: None,
        });
        assert!(store.register_observation("", file).is_err());
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let mut store = IdentificationStore::new();
        let bogus_file: Id<InputFile> = Id::new(999);
        assert!(store.register_observation("scan=1", bogus_file).is_err());
    }

    #[test]
    fn conflicting_score_orientation_fails() {
        let mut store = IdentificationStore::new();
        store
            .register_score_type(ScoreType {
                name: "q-value".into(),
                higher_better: false,
            })
            .unwrap();
        let result = store.register_score_type(ScoreType {
            name: "q-value".into(),
            higher_better: true,
        });
        assert!(result.is_err());
    }

    #[test]
    fn coverage_is_union_of_match_intervals() {
        let mut store = sample_store();
        store.calculate_coverages(true);
        let parent = store.parents.iter().next().unwrap().1;
        // "PEPTIDE" covers positions 0..=6 of a 15-character sequence.
        assert!((parent.coverage - 7.0 / 15.0).abs() < 1e-9);
        assert!(parent.coverage >= 0.0 && parent.coverage <= 1.0);
    }

    #[test]
    fn merge_idempotence_doubles_entity_counts() {
        let a = sample_store();
        let before = a.entity_counts();

        let mut once = IdentificationStore::new();
        let t1 = once.merge(&a);
        assert_eq!(once.entity_counts(), before);
        // every new ref the translator hands back must resolve in `once`.
        assert!(t1
            .input_files
            .values()
            .all(|&new| once.input_files.contains(new)));

        let mut twice = IdentificationStore::new();
        twice.merge(&once);
        twice.merge(&a);
        assert_eq!(twice.entity_counts(), before * 2);
    }

    #[test]
    fn best_match_per_observation_respects_orientation() {
        let mut store = IdentificationStore::new();
        let file = store.register_input_file(InputFile {
            name: "a".into(),
            experimental_design: None,
        });
        let score = store
            .register_score_type(ScoreType {
                name: "score".into(),
                higher_better: true,
            })
            .unwrap();
        let software = store.register_processing_software(ProcessingSoftware {
            name: "Engine".into(),
            version: "1.0".into(),
        });
        let step = store
            .register_processing_step(ProcessingStep {
                software,
                input_files: vec![file],
                search_param: None,
            })
            .unwrap();
        let obs = store.register_observation("scan=1", file).unwrap();

        store.set_current_processing_step(step);
        let parent = store
            .register_parent_sequence(ParentSequence {
                accession: "P1".into(),
                molecule_type: crate::entities::MoleculeType::Protein,
                sequence: "PEPTIDE".into(),
                coverage: 0.0,
                decoy: false,
                applied_processing_steps: AppliedProcessingSteps::default(),
            })
            .unwrap();
        let mut match_ids = vec![];
        for (name, value) in [("PEPTIDE", 0.9), ("PEPTIDF", 0.5)] {
            let molecule = store
                .register_identified_peptide(IdentifiedMolecule {
                    identity: name.into(),
                    parent_matches: vec![ParentMatch {
                        parent,
                        start: 0,
                        end: 6,
                    }],
                    applied_processing_steps: AppliedProcessingSteps::default(),
                    meta: HashMap::new(),
                })
                .unwrap();
            let m = store
                .register_observation_match(ObservationMatch {
                    molecule: MoleculeRef::Peptide(molecule),
                    observation: obs,
                    charge: 2,
                    adduct: None,
                    peak_annotations: vec![],
                    applied_processing_steps: AppliedProcessingSteps::default(),
                    meta: HashMap::new(),
                })
                .unwrap();
            store.add_score(m, score, value).unwrap();
            match_ids.push(m);
        }

        let best = store.get_best_match_per_observation(score, true).unwrap();
        assert_eq!(best.get(&obs), Some(&match_ids[0]));
    }
}
