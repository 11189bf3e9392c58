//! Binary classification metrics
//!
//! Thresholded metrics use a 0.5 cut on the positive-class probability. AUC is
//! the Mann-Whitney rank statistic with average ranks for tied scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, Result};
use super::label::{class_counts, require_both_classes};
use super::matrix::FeatureMatrix;
use super::model::TrainedModel;

/// Probability at or above which a row is predicted positive
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Probabilities are clipped to `[EPS, 1 - EPS]` before taking logs
const LOG_LOSS_EPS: f64 = 1e-15;

/// Scores compared with the AUC are treated as tied within this distance
const TIE_EPSILON: f64 = 1e-12;

/// Evaluation results for a binary classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryMetrics {
    pub accuracy: f64,
    pub auc: f64,
    pub f1_score: f64,
    pub positive_precision: f64,
    pub positive_recall: f64,
    pub negative_precision: f64,
    pub negative_recall: f64,
    pub log_loss: f64,
    pub log_loss_reduction: f64,
}

/// Metric recomputed on every permuted copy of the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportanceMetric {
    #[default]
    Auc,
    Accuracy,
    F1,
    LogLoss,
}

impl ImportanceMetric {
    /// Label used in report headers, e.g. "Change in AUC"
    pub fn display_name(&self) -> &'static str {
        match self {
            ImportanceMetric::Auc => "AUC",
            ImportanceMetric::Accuracy => "Accuracy",
            ImportanceMetric::F1 => "F1 Score",
            ImportanceMetric::LogLoss => "Log Loss",
        }
    }

    /// Compute this metric from probabilities
    pub fn score(&self, probabilities: &[f64], labels: &[bool]) -> Result<f64> {
        check_lengths(probabilities, labels)?;
        match self {
            ImportanceMetric::Auc => auc(probabilities, labels),
            ImportanceMetric::Accuracy => Ok(ConfusionMatrix::new(probabilities, labels).accuracy()),
            ImportanceMetric::F1 => Ok(ConfusionMatrix::new(probabilities, labels).f1()),
            ImportanceMetric::LogLoss => Ok(log_loss(probabilities, labels)),
        }
    }
}

impl fmt::Display for ImportanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportanceMetric::Auc => "auc",
            ImportanceMetric::Accuracy => "accuracy",
            ImportanceMetric::F1 => "f1",
            ImportanceMetric::LogLoss => "log-loss",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ImportanceMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auc" => Ok(ImportanceMetric::Auc),
            "accuracy" | "acc" => Ok(ImportanceMetric::Accuracy),
            "f1" | "f1-score" => Ok(ImportanceMetric::F1),
            "log-loss" | "logloss" => Ok(ImportanceMetric::LogLoss),
            _ => Err(format!(
                "Unknown metric '{}'. Expected one of: auc, accuracy, f1, log-loss",
                s
            )),
        }
    }
}

fn check_lengths(probabilities: &[f64], labels: &[bool]) -> Result<()> {
    if probabilities.len() != labels.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: labels.len(),
            actual: probabilities.len(),
        });
    }
    Ok(())
}

/// Counts at the decision threshold
#[derive(Debug, Clone, Copy, Default)]
struct ConfusionMatrix {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ConfusionMatrix {
    fn new(probabilities: &[f64], labels: &[bool]) -> Self {
        let mut cm = Self::default();
        for (&p, &actual) in probabilities.iter().zip(labels.iter()) {
            match (p >= DECISION_THRESHOLD, actual) {
                (true, true) => cm.tp += 1,
                (true, false) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (false, true) => cm.fn_ += 1,
            }
        }
        cm
    }

    fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.tp + self.tn + self.fp + self.fn_)
    }

    fn positive_precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    fn positive_recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    fn negative_precision(&self) -> f64 {
        ratio(self.tn, self.tn + self.fn_)
    }

    fn negative_recall(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    fn f1(&self) -> f64 {
        let p = self.positive_precision();
        let r = self.positive_recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// Area under the ROC curve.
///
/// Scores are ranked ascending; tied scores share their average rank, so a
/// constant scorer gets exactly 0.5. Fails with `SingleClass` when only one
/// class is present.
pub fn auc(scores: &[f64], labels: &[bool]) -> Result<f64> {
    check_lengths(scores, labels)?;
    require_both_classes(labels)?;
    let (n_pos, n_neg) = class_counts(labels);

    let mut pairs: Vec<(f64, bool)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let current = pairs[i].0;
        let mut j = i;
        while j < n && (pairs[j].0 - current).abs() < TIE_EPSILON {
            j += 1;
        }
        // Ranks are 1-based: the group spans i+1 ..= j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives = pairs[i..j].iter().filter(|(_, label)| *label).count();
        rank_sum_pos += avg_rank * positives as f64;
        i = j;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    let u = rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0;
    Ok(u / (n_pos * n_neg))
}

/// Mean negative log-likelihood of the labels
pub fn log_loss(probabilities: &[f64], labels: &[bool]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = probabilities
        .iter()
        .zip(labels.iter())
        .map(|(&p, &y)| {
            let p = p.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS);
            if y {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / labels.len() as f64
}

/// Log-loss of always predicting the class prior
fn prior_log_loss(labels: &[bool]) -> f64 {
    let (pos, _) = class_counts(labels);
    let prior = pos as f64 / labels.len().max(1) as f64;
    log_loss(&vec![prior; labels.len()], labels)
}

/// Score every row and compute the full metric set
pub fn evaluate(
    model: &TrainedModel,
    features: &FeatureMatrix,
    labels: &[bool],
) -> Result<BinaryMetrics> {
    if features.nrows() != labels.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: features.nrows(),
            actual: labels.len(),
        });
    }
    let probabilities = model.predict_proba_batch(features)?;
    metrics_from_probabilities(&probabilities, labels)
}

/// Full metric set from precomputed probabilities
pub fn metrics_from_probabilities(probabilities: &[f64], labels: &[bool]) -> Result<BinaryMetrics> {
    let auc = auc(probabilities, labels)?;
    let cm = ConfusionMatrix::new(probabilities, labels);
    let log_loss = log_loss(probabilities, labels);
    let prior = prior_log_loss(labels);
    let log_loss_reduction = if prior > 0.0 {
        (prior - log_loss) / prior
    } else {
        0.0
    };

    Ok(BinaryMetrics {
        accuracy: cm.accuracy(),
        auc,
        f1_score: cm.f1(),
        positive_precision: cm.positive_precision(),
        positive_recall: cm.positive_recall(),
        negative_precision: cm.negative_precision(),
        negative_recall: cm.negative_recall(),
        log_loss,
        log_loss_reduction,
    })
}
