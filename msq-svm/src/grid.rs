//! Cross-validation and grid search (§4.3.4).

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use msq_core::stats::pearson_correlation;

use crate::error::{Result, SvmError};
use crate::kernel::OligoKernel;
use crate::matrix::KernelMatrix;
use crate::problem::{SvmBackend, SvmKind, SvmParameters, SvmProblem};

/// Which hyperparameter a grid dimension sweeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GridParam {
    /// Regularization strength `C`.
    C,
    /// Nu parameter.
    Nu,
    /// Epsilon-insensitive width.
    Epsilon,
    /// Oligo kernel Gaussian width.
    Sigma,
}

/// One grid dimension: `start`, `step`, and inclusive `end` (with a small
/// tolerance applied per spec.md: `end + 1e-4`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridDimension {
    /// Starting value.
    pub start: f64,
    /// Step size (added or multiplied, per `additive_step_sizes`).
    pub step: f64,
    /// Inclusive upper bound.
    pub end: f64,
}

const GRID_TOLERANCE: f64 = 1e-4;

/// A parameter grid: one [`GridDimension`] per swept hyperparameter, ordered
/// by [`GridParam`] so "lowest-index parameter" is well-defined.
pub type ParamGrid = BTreeMap<GridParam, GridDimension>;

/// Advance the grid point `current` in place, per spec.md §4.3.4: the
/// lowest-index parameter is advanced by its step; if doing so would exceed
/// `end + 1e-4`, that parameter resets to `start` and the carry cascades to
/// the next parameter. Returns `true` if a new valid grid point was
/// produced, `false` once every dimension has cycled back to its start (the
/// grid is exhausted).
pub fn next_grid(current: &mut BTreeMap<GridParam, f64>, grid: &ParamGrid, additive: bool) -> bool {
    for (param, dim) in grid {
        let value = current[param];
        let advanced = if additive { value + dim.step } else { value * dim.step };
        if advanced <= dim.end + GRID_TOLERANCE {
            current.insert(*param, advanced);
            return true;
        }
        current.insert(*param, dim.start);
    }
    false
}

/// Initialize a grid point at every dimension's `start`.
#[must_use]
pub fn grid_start(grid: &ParamGrid) -> BTreeMap<GridParam, f64> {
    grid.iter().map(|(&param, dim)| (param, dim.start)).collect()
}

fn apply_grid_point(base: SvmParameters, point: &BTreeMap<GridParam, f64>) -> SvmParameters {
    let mut params = base;
    if let Some(&c) = point.get(&GridParam::C) {
        params.c = c;
    }
    if let Some(&nu) = point.get(&GridParam::Nu) {
        params.nu = nu;
    }
    if let Some(&epsilon) = point.get(&GridParam::Epsilon) {
        params.epsilon = epsilon;
    }
    params
}

/// The outcome of [`cross_validate`]: the best-performing grid point and
/// its averaged performance.
#[derive(Clone, Debug)]
pub struct GridSearchResult {
    /// The winning grid point's hyperparameter values.
    pub best_params: BTreeMap<GridParam, f64>,
    /// Its performance, averaged across runs and folds.
    pub best_performance: f64,
}

fn classification_rate(predictions: &[f64], labels: &[f64]) -> f64 {
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(&p, &l)| p.signum() == l.signum())
        .count();
    correct as f64 / labels.len() as f64
}

fn matthews_correlation(predictions: &[f64], labels: &[f64]) -> f64 {
    let (mut tp, mut tn, mut fp, mut fn_) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    for (&p, &l) in predictions.iter().zip(labels) {
        match (p.signum() >= 0.0, l.signum() >= 0.0) {
            (true, true) => tp += 1.0,
            (false, false) => tn += 1.0,
            (true, false) => fp += 1.0,
            (false, true) => fn_ += 1.0,
        }
    }
    let denom = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        (tp * tn - fp * fn_) / denom
    }
}

fn performance(kind: SvmKind, predictions: &[f64], labels: &[f64], mcc: bool) -> f64 {
    if kind.is_regression() {
        pearson_correlation(predictions, labels)
    } else if mcc {
        matthews_correlation(predictions, labels)
    } else {
        classification_rate(predictions, labels)
    }
}

/// Random-partition `n` sample indices into `k` near-equal folds.
fn partition(n: usize, k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<usize>> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let mut folds = vec![Vec::new(); k];
    for (i, idx) in indices.into_iter().enumerate() {
        folds[i % k].push(idx);
    }
    folds
}

/// Cross-validated grid search (§4.3.4). Reports per-fold progress through
/// `on_progress(completed, total)` (supplemented feature 3).
#[allow(clippy::too_many_arguments)]
pub fn cross_validate(
    backend: &dyn SvmBackend,
    oligo: &mut OligoKernel,
    problem: &SvmProblem,
    base_params: SvmParameters,
    grid: &ParamGrid,
    runs: usize,
    partitions: usize,
    additive_step_sizes: bool,
    mcc_as_performance_measure: bool,
    seed: u64,
    mut on_progress: Option<&mut dyn FnMut(usize, usize)>,
) -> Result<GridSearchResult> {
    if grid.is_empty() {
        return Err(SvmError::MissingInformation(
            "grid search requires at least one swept parameter".into(),
        ));
    }
    if problem.sequences.len() < partitions {
        return Err(SvmError::InvalidParameter {
            name: "partitions".into(),
            reason: "must not exceed the number of training samples".into(),
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut grid_points = Vec::new();
    let mut point = grid_start(grid);
    grid_points.push(point.clone());
    while next_grid(&mut point, grid, additive_step_sizes) {
        grid_points.push(point.clone());
    }

    let total_steps = grid_points.len() * runs * partitions;
    let mut completed = 0usize;

    let mut best: Option<(BTreeMap<GridParam, f64>, f64)> = None;
    for candidate in &grid_points {
        let params = apply_grid_point(base_params, candidate);
        let mut total_performance = 0.0;
        for _ in 0..runs {
            let folds = partition(problem.sequences.len(), partitions, &mut rng);
            for fold in &folds {
                let held_out: std::collections::HashSet<usize> = fold.iter().copied().collect();
                let train_sequences: Vec<_> = problem
                    .sequences
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !held_out.contains(i))
                    .map(|(_, s)| s.clone())
                    .collect();
                let train_labels: Vec<_> = problem
                    .labels
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !held_out.contains(i))
                    .map(|(_, &l)| l)
                    .collect();
                let held_sequences: Vec<_> = fold.iter().map(|&i| problem.sequences[i].clone()).collect();
                let held_labels: Vec<_> = fold.iter().map(|&i| problem.labels[i]).collect();

                let train_matrix = KernelMatrix::build(oligo, &train_sequences, &train_sequences, true);
                let model = backend.fit(&train_matrix, &train_labels, &params)?;
                let test_matrix = KernelMatrix::build(oligo, &held_sequences, &train_sequences, false);
                let predictions: Vec<f64> = (0..held_sequences.len())
                    .map(|i| backend.decision_value(&model, test_matrix.values(i)))
                    .collect();
                total_performance += performance(
                    params.kind,
                    &predictions,
                    &held_labels,
                    mcc_as_performance_measure,
                );

                completed += 1;
                if let Some(cb) = on_progress.as_deref_mut() {
                    cb(completed, total_steps);
                }
            }
        }
        let mean_performance = total_performance / (runs * partitions) as f64;
        if best.as_ref().map_or(true, |(_, best_perf)| mean_performance > *best_perf) {
            best = Some((candidate.clone(), mean_performance));
        }
    }

    let (best_params, best_performance) = best.expect("grid_points is never empty");
    Ok(GridSearchResult {
        best_params,
        best_performance,
    })
}
