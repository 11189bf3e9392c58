//! Permutation feature importance
//!
//! For every feature group the rows of the group's columns are shuffled R
//! times and the chosen metric is recomputed. The importance of the group is
//! the mean change against the unshuffled baseline, with its standard error.
//! Each (group, repetition) pair draws its permutation from its own ChaCha8
//! stream of the run seed, so results do not depend on thread scheduling and
//! are the same on every platform.

use indicatif::ProgressBar;
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, Result};
use super::features::FeatureGroup;
use super::matrix::FeatureMatrix;
use super::metrics::ImportanceMetric;
use super::model::TrainedModel;
use crate::utils::{create_progress_bar, hidden_progress_bar};

/// Settings for one importance run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermutationConfig {
    /// Shuffles per feature group
    pub repetitions: usize,
    pub seed: u64,
    pub metric: ImportanceMetric,
    /// Draw a progress bar on stderr
    #[serde(skip)]
    pub show_progress: bool,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            repetitions: 3,
            seed: 0,
            metric: ImportanceMetric::Auc,
            show_progress: false,
        }
    }
}

/// Importance of one feature group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub name: String,
    /// Feature-vector slots that were permuted together
    pub indices: Vec<usize>,
    /// Mean of `deltas`
    pub mean: f64,
    /// Sample standard deviation of `deltas` over √R; exactly 0 when R = 1
    pub std_error: f64,
    /// Metric change per repetition
    pub deltas: Vec<f64>,
}

impl FeatureImportance {
    /// Half-width of the 95% confidence interval of the mean
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }
}

/// Baseline plus per-group results, in group order
#[derive(Debug, Clone, Serialize)]
pub struct PermutationImportance {
    pub metric: ImportanceMetric,
    pub baseline: f64,
    pub features: Vec<FeatureImportance>,
}

/// Mean and standard error of the mean
pub fn mean_and_std_error(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n == 1 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, variance.sqrt() / (n as f64).sqrt())
}

/// RNG for one (group, repetition) shuffle: the run seed selects the key and
/// the pair selects the stream (group in the high 32 bits).
pub fn permutation_rng(seed: u64, group: usize, repetition: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(((group as u64) << 32) | (repetition as u64 & 0xffff_ffff));
    rng
}

/// Row permutation for one (group, repetition) shuffle
pub fn row_permutation(rows: usize, seed: u64, group: usize, repetition: usize) -> Vec<usize> {
    let mut rng = permutation_rng(seed, group, repetition);
    let mut permutation: Vec<usize> = (0..rows).collect();
    permutation.shuffle(&mut rng);
    permutation
}

/// Probabilities with `columns` taken from row `permutation[r]` for each row `r`
fn permuted_probabilities(
    model: &TrainedModel,
    features: &FeatureMatrix,
    columns: &[usize],
    permutation: &[usize],
) -> Result<Vec<f64>> {
    let mut buffer = Array1::zeros(features.ncols());
    let mut probabilities = Vec::with_capacity(features.nrows());
    for (row, &source) in features.rows().into_iter().zip(permutation) {
        buffer.assign(&row);
        for &c in columns {
            buffer[c] = features[[source, c]];
        }
        probabilities.push(model.predict_proba_row(buffer.view())?);
    }
    Ok(probabilities)
}

fn validate(
    model: &TrainedModel,
    features: &FeatureMatrix,
    labels: &[bool],
    groups: &[FeatureGroup],
    config: &PermutationConfig,
) -> Result<()> {
    if config.repetitions == 0 {
        return Err(AnalysisError::InvalidConfig(
            "permutation count must be at least 1".to_string(),
        ));
    }
    if features.nrows() != labels.len() {
        return Err(AnalysisError::ShapeMismatch {
            expected: features.nrows(),
            actual: labels.len(),
        });
    }
    if features.ncols() != model.n_features() {
        return Err(AnalysisError::ShapeMismatch {
            expected: model.n_features(),
            actual: features.ncols(),
        });
    }
    if features.nrows() == 0 {
        return Err(AnalysisError::EmptyTrainingSet);
    }
    if let Some(group) = groups
        .iter()
        .find(|g| g.indices.iter().any(|&i| i >= features.ncols()))
    {
        return Err(AnalysisError::InvalidConfig(format!(
            "feature group '{}' refers to a slot outside the {}-wide feature vector",
            group.name,
            features.ncols()
        )));
    }
    Ok(())
}

/// Run permutation importance for every group.
///
/// Results come back in the order of `groups`; ranking is left to the
/// reporter.
pub fn permutation_importance(
    model: &TrainedModel,
    features: &FeatureMatrix,
    labels: &[bool],
    groups: &[FeatureGroup],
    config: &PermutationConfig,
) -> Result<PermutationImportance> {
    validate(model, features, labels, groups, config)?;

    let metric = config.metric;
    let baseline = metric.score(&model.predict_proba_batch(features)?, labels)?;
    log::debug!(
        "Baseline {} = {:.6} over {} rows, {} group(s) x {} repetition(s)",
        metric,
        baseline,
        features.nrows(),
        groups.len(),
        config.repetitions
    );

    let pb = if config.show_progress {
        create_progress_bar(groups.len() as u64, "Permuting features")
    } else {
        hidden_progress_bar()
    };

    let results: Result<Vec<FeatureImportance>> = groups
        .par_iter()
        .enumerate()
        .map(|(g, group)| {
            let result = importance_of_group(model, features, labels, g, group, baseline, config);
            pb.inc(1);
            result
        })
        .collect();
    let features_out = results?;

    finish_progress(&pb, groups.len());

    Ok(PermutationImportance {
        metric,
        baseline,
        features: features_out,
    })
}

fn importance_of_group(
    model: &TrainedModel,
    features: &FeatureMatrix,
    labels: &[bool],
    group_index: usize,
    group: &FeatureGroup,
    baseline: f64,
    config: &PermutationConfig,
) -> Result<FeatureImportance> {
    let deltas = (0..config.repetitions)
        .map(|rep| {
            let permutation = row_permutation(features.nrows(), config.seed, group_index, rep);
            let probabilities = permuted_probabilities(model, features, &group.indices, &permutation)?;
            Ok(config.metric.score(&probabilities, labels)? - baseline)
        })
        .collect::<Result<Vec<f64>>>()?;

    let (mean, std_error) = mean_and_std_error(&deltas);
    Ok(FeatureImportance {
        name: group.name.clone(),
        indices: group.indices.clone(),
        mean,
        std_error,
        deltas,
    })
}

fn finish_progress(pb: &ProgressBar, groups: usize) {
    if !pb.is_hidden() {
        pb.finish_with_message(format!("   [OK] Permuted {} feature group(s)", groups));
    }
}
