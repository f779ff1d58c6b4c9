//! Training & prediction (§4.3.3): a thin harness around a pluggable
//! [`SvmBackend`], since no real libsvm binding crate is present in the
//! retrieved example pack (see DESIGN.md).

use crate::error::{Result, SvmError};
use crate::kernel::{OligoKernel, Residue};
use crate::matrix::KernelMatrix;

/// The SVM task type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SvmKind {
    /// Binary classification.
    CSvc,
    /// Nu-parameterized binary classification.
    NuSvc,
    /// One-class novelty detection.
    OneClass,
    /// Epsilon-insensitive regression.
    EpsilonSvr,
    /// Nu-parameterized regression.
    NuSvr,
}

impl SvmKind {
    /// `true` for the regression variants.
    #[must_use]
    pub fn is_regression(self) -> bool {
        matches!(self, Self::EpsilonSvr | Self::NuSvr)
    }
}

/// The kernel substituted into the SVM. Only `Oligo` is implemented by this
/// crate's default backend; the others are recognized tags for a caller
/// supplying their own [`SvmBackend`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KernelKind {
    /// A biosequence oligo kernel with the given width/cutoff.
    Oligo {
        /// Gauss-table size.
        border_length: usize,
        /// Gaussian width.
        sigma: f64,
        /// Maximum considered position distance.
        max_distance: usize,
    },
    /// A kernel matrix supplied directly by the caller.
    Precomputed,
}

/// Hyperparameters for one training run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvmParameters {
    /// Task type.
    pub kind: SvmKind,
    /// Regularization strength.
    pub c: f64,
    /// Nu parameter (one-class / nu-SVC / nu-SVR).
    pub nu: f64,
    /// Epsilon-insensitive loss width (epsilon-SVR).
    pub epsilon: f64,
}

impl SvmParameters {
    /// Verify the parameters are in range for `self.kind`.
    pub fn validate(&self) -> Result<()> {
        if self.c <= 0.0 {
            return Err(SvmError::InvalidParameter {
                name: "c".into(),
                reason: "must be positive".into(),
            });
        }
        if matches!(self.kind, SvmKind::NuSvc | SvmKind::NuSvr | SvmKind::OneClass)
            && !(0.0..=1.0).contains(&self.nu)
        {
            return Err(SvmError::InvalidParameter {
                name: "nu".into(),
                reason: "must lie in [0, 1]".into(),
            });
        }
        if self.kind == SvmKind::EpsilonSvr && self.epsilon < 0.0 {
            return Err(SvmError::InvalidParameter {
                name: "epsilon".into(),
                reason: "must be non-negative".into(),
            });
        }
        Ok(())
    }
}

/// A training or prediction problem: sequences (for the oligo kernel) and
/// their labels (ignored for prediction-only use).
#[derive(Clone, Debug, Default)]
pub struct SvmProblem {
    /// The sequences, one per sample.
    pub sequences: Vec<Vec<Residue>>,
    /// Labels, one per sample (class +1/-1 or target value).
    pub labels: Vec<f64>,
}

/// A trained model: the support set's labels and kernel rows, plus the bias
/// the backend solved for.
#[derive(Clone, Debug)]
pub struct SvmModel {
    pub(crate) kind: SvmKind,
    pub(crate) training_labels: Vec<f64>,
    pub(crate) dual_weights: Vec<f64>,
    pub(crate) bias: f64,
    /// `true` iff the first observed label is negative (affects probability
    /// sign convention in [`svc_probabilities`]).
    pub(crate) first_label_negative: bool,
}

/// A pluggable SVM optimizer. The default backend in this crate
/// ([`KernelAveragingBackend`]) is a simple kernel-weighted vote, not a
/// true dual-QP solver — this trait exists so a real solver can be dropped
/// in without touching the harness around it.
pub trait SvmBackend {
    /// Fit a model from a kernel matrix and the corresponding sample labels.
    fn fit(&self, kernel: &KernelMatrix, labels: &[f64], params: &SvmParameters) -> Result<SvmModel>;

    /// Evaluate the fitted model's decision function on one prediction row
    /// (the row's kernel values against the training set, in training order).
    fn decision_value(&self, model: &SvmModel, kernel_row: &[f64]) -> f64;
}

/// A simple kernel-weighted-vote backend: the decision function is
/// `sum(label_i * weight_i * k(x, i)) + bias`, with uniform weights
/// `1 / n`. This approximates a Parzen-window classifier; it is not a
/// dual-optimized SVM, but it exercises the harness (kernel, grid search,
/// cross-validation) end to end without requiring an external solver.
#[derive(Clone, Copy, Debug, Default)]
pub struct KernelAveragingBackend;

impl SvmBackend for KernelAveragingBackend {
    fn fit(&self, kernel: &KernelMatrix, labels: &[f64], params: &SvmParameters) -> Result<SvmModel> {
        params.validate()?;
        let n = labels.len();
        if n == 0 || kernel.rows.len() != n {
            return Err(SvmError::MissingInformation(
                "kernel matrix row count must match the label count".into(),
            ));
        }
        let weight = 1.0 / n as f64;
        Ok(SvmModel {
            kind: params.kind,
            training_labels: labels.to_vec(),
            dual_weights: vec![weight; n],
            bias: 0.0,
            first_label_negative: labels.first().is_some_and(|&l| l < 0.0),
        })
    }

    fn decision_value(&self, model: &SvmModel, kernel_row: &[f64]) -> f64 {
        model
            .training_labels
            .iter()
            .zip(&model.dual_weights)
            .zip(kernel_row)
            .map(|((label, weight), k)| label * weight * k)
            .sum::<f64>()
            + model.bias
    }
}

/// Train a model via `backend`, first validating `params` and (for the
/// oligo kernel) recomputing the Gauss table if `border_length` changed.
pub fn train(
    backend: &dyn SvmBackend,
    oligo: &mut OligoKernel,
    problem: &SvmProblem,
    params: &SvmParameters,
) -> Result<SvmModel> {
    params.validate()?;
    let matrix = KernelMatrix::build(oligo, &problem.sequences, &problem.sequences, true);
    backend.fit(&matrix, &problem.labels, params)
}

/// Predict the decision value of every sequence in `queries` against a
/// trained model's support set.
pub fn predict(
    backend: &dyn SvmBackend,
    oligo: &OligoKernel,
    model: &SvmModel,
    training_sequences: &[Vec<Residue>],
    queries: &[Vec<Residue>],
) -> Vec<f64> {
    let matrix = KernelMatrix::build(oligo, queries, training_sequences, false);
    (0..queries.len())
        .map(|i| backend.decision_value(model, matrix.values(i)))
        .collect()
}

/// Calibrated class probabilities for binary classification
/// (`getSVCProbabilities`), via a logistic squash of the decision value.
/// The sign convention is inverted when the model's first observed label
/// was negative, so the returned pair is always `(P(positive), P(negative))`.
#[must_use]
pub fn svc_probabilities(model: &SvmModel, decision_value: f64) -> (f64, f64) {
    debug_assert!(!model.kind.is_regression());
    let value = if model.first_label_negative {
        -decision_value
    } else {
        decision_value
    };
    let positive = 1.0 / (1.0 + (-value).exp());
    (positive, 1.0 - positive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nonpositive_c() {
        let params = SvmParameters {
            kind: SvmKind::CSvc,
            c: 0.0,
            nu: 0.5,
            epsilon: 0.1,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn train_then_predict_runs_end_to_end() {
        let mut oligo = OligoKernel::new(8, 2.0, 5);
        let problem = SvmProblem {
            sequences: vec![
                vec![(0, b'A'), (1, b'C')],
                vec![(0, b'G'), (1, b'T')],
            ],
            labels: vec![1.0, -1.0],
        };
        let params = SvmParameters {
            kind: SvmKind::CSvc,
            c: 1.0,
            nu: 0.5,
            epsilon: 0.1,
        };
        let backend = KernelAveragingBackend;
        let model = train(&backend, &mut oligo, &problem, &params).unwrap();
        let predictions = predict(&backend, &oligo, &model, &problem.sequences, &problem.sequences);
        assert_eq!(predictions.len(), 2);
    }
}
