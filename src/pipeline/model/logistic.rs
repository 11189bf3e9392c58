//! L2-regularized logistic regression trained with L-BFGS

use ndarray::{s, Array1};
use serde::{Deserialize, Serialize};

use super::lbfgs::{minimize, LbfgsConfig};
use super::{sigmoid, LinearBinaryModel, TrainedModel};
use crate::pipeline::error::{AnalysisError, Result};
use crate::pipeline::label::require_both_classes;
use crate::pipeline::matrix::FeatureMatrix;

/// Trainer settings. The objective is mean log-loss plus `l2 / 2 · ||w||²`;
/// the bias is not regularized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionTrainer {
    pub l2: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    /// L-BFGS history size
    pub memory: usize,
}

impl Default for LogisticRegressionTrainer {
    fn default() -> Self {
        Self {
            l2: 1e-3,
            max_iterations: 200,
            tolerance: 1e-7,
            memory: 10,
        }
    }
}

/// `ln(1 + e^z)` without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

impl LogisticRegressionTrainer {
    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    pub fn fit(&self, features: &FeatureMatrix, labels: &[bool]) -> Result<TrainedModel> {
        if features.nrows() != labels.len() {
            return Err(AnalysisError::ShapeMismatch {
                expected: features.nrows(),
                actual: labels.len(),
            });
        }
        if features.nrows() == 0 {
            return Err(AnalysisError::EmptyTrainingSet);
        }
        require_both_classes(labels)?;

        let d = features.ncols();
        let n = features.nrows() as f64;
        let targets: Array1<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();
        let l2 = self.l2;

        // params = [w_0 .. w_{d-1}, b]
        let objective = |params: &Array1<f64>, grad: &mut Array1<f64>| -> f64 {
            let w = params.slice(s![..d]);
            let b = params[d];

            let z = features.dot(&w) + b;
            let loss: f64 = z
                .iter()
                .zip(targets.iter())
                .map(|(&zi, &yi)| softplus(zi) - yi * zi)
                .sum();
            let residual = z.mapv(sigmoid) - &targets;

            let grad_w = features.t().dot(&residual) / n + &w * l2;
            grad.slice_mut(s![..d]).assign(&grad_w);
            grad[d] = residual.sum() / n;

            loss / n + w.dot(&w) * l2 / 2.0
        };

        let config = LbfgsConfig {
            memory: self.memory,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        };
        let outcome = minimize(objective, Array1::zeros(d + 1), &config);

        if outcome.converged {
            log::debug!(
                "Logistic regression converged in {} iteration(s), loss {:.6}",
                outcome.iterations,
                outcome.value
            );
        } else {
            log::warn!(
                "Logistic regression stopped after {} iteration(s) without converging (loss {:.6})",
                outcome.iterations,
                outcome.value
            );
        }

        let weights = outcome.x.slice(s![..d]).to_owned();
        let bias = outcome.x[d];
        Ok(TrainedModel::Linear(LinearBinaryModel::new(weights, bias)))
    }
}
