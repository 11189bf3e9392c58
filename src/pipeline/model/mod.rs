//! Trained binary classifiers
//!
//! Training returns a [`TrainedModel`], a tagged variant over the model kinds
//! this crate knows about. Callers that need linear weights match on it (or
//! call [`TrainedModel::linear`]) instead of assuming a concrete type.

mod lbfgs;
mod logistic;

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::Serialize;

use super::error::{AnalysisError, Result};
use super::matrix::FeatureMatrix;

pub use lbfgs::{minimize, LbfgsConfig, LbfgsOutcome};
pub use logistic::LogisticRegressionTrainer;

/// Anything that maps a feature row to a positive-class probability
pub trait Scorer: Send + Sync + std::fmt::Debug {
    /// Short name of the model family
    fn kind(&self) -> &str;

    /// Width of the rows the model was trained on
    fn n_features(&self) -> usize;

    /// Probability of the positive class. `row.len()` is already checked.
    fn score_row(&self, row: ArrayView1<f64>) -> f64;

    /// Probabilities for every row. The width is already checked.
    fn score_batch(&self, features: ArrayView2<f64>) -> Array1<f64> {
        features.rows().into_iter().map(|row| self.score_row(row)).collect()
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Linear binary classifier: `sigmoid(w·x + b)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearBinaryModel {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearBinaryModel {
    pub fn new(weights: Array1<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Raw score `w·x + b`
    pub fn margin(&self, row: ArrayView1<f64>) -> f64 {
        self.weights.dot(&row) + self.bias
    }
}

impl Scorer for LinearBinaryModel {
    fn kind(&self) -> &str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn score_row(&self, row: ArrayView1<f64>) -> f64 {
        sigmoid(self.margin(row))
    }

    fn score_batch(&self, features: ArrayView2<f64>) -> Array1<f64> {
        (features.dot(&self.weights) + self.bias).mapv(sigmoid)
    }
}

/// Result of training
#[derive(Debug)]
pub enum TrainedModel {
    Linear(LinearBinaryModel),
    /// A model with no linear parameters; only scoring is available
    Opaque(Box<dyn Scorer>),
}

impl TrainedModel {
    fn scorer(&self) -> &dyn Scorer {
        match self {
            TrainedModel::Linear(model) => model,
            TrainedModel::Opaque(model) => model.as_ref(),
        }
    }

    pub fn kind(&self) -> &str {
        self.scorer().kind()
    }

    pub fn n_features(&self) -> usize {
        self.scorer().n_features()
    }

    /// The linear parameters, or `UnsupportedModel` for other kinds
    pub fn linear(&self) -> Result<&LinearBinaryModel> {
        match self {
            TrainedModel::Linear(model) => Ok(model),
            TrainedModel::Opaque(model) => Err(AnalysisError::UnsupportedModel {
                kind: model.kind().to_string(),
            }),
        }
    }

    /// Positive-class probability for one row
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64> {
        self.predict_proba_row(ArrayView1::from(row))
    }

    pub fn predict_proba_row(&self, row: ArrayView1<f64>) -> Result<f64> {
        let scorer = self.scorer();
        if row.len() != scorer.n_features() {
            return Err(AnalysisError::ShapeMismatch {
                expected: scorer.n_features(),
                actual: row.len(),
            });
        }
        Ok(scorer.score_row(row))
    }

    /// Positive-class probabilities for every row
    pub fn predict_proba_batch(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        let scorer = self.scorer();
        if features.ncols() != scorer.n_features() {
            return Err(AnalysisError::ShapeMismatch {
                expected: scorer.n_features(),
                actual: features.ncols(),
            });
        }
        Ok(scorer.score_batch(features.view()).to_vec())
    }
}
