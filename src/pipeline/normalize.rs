//! Feature normalization fitted on training rows
//!
//! Statistics are computed once from the training matrix and applied
//! unchanged to every matrix transformed afterwards.

use ndarray::{Array1, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, Result};
use super::matrix::FeatureMatrix;

/// Normalization strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizerKind {
    /// Divide by the largest absolute value; zero stays zero
    #[default]
    MinMax,
    /// Subtract the mean and divide by the standard deviation
    MeanVariance,
}

impl std::fmt::Display for NormalizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizerKind::MinMax => write!(f, "min-max"),
            NormalizerKind::MeanVariance => write!(f, "mean-variance"),
        }
    }
}

impl std::str::FromStr for NormalizerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "min-max" | "minmax" => Ok(NormalizerKind::MinMax),
            "mean-variance" | "meanvariance" | "z-score" => Ok(NormalizerKind::MeanVariance),
            _ => Err(format!(
                "Unknown normalizer: '{}'. Use 'min-max' or 'mean-variance'.",
                s
            )),
        }
    }
}

/// Per-column affine transform `(x - offset) * scale`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalizer {
    pub kind: NormalizerKind,
    pub offsets: Array1<f64>,
    pub scales: Array1<f64>,
}

impl Normalizer {
    pub fn fit(kind: NormalizerKind, train: &FeatureMatrix) -> Self {
        let (offsets, scales): (Vec<f64>, Vec<f64>) = train
            .axis_iter(Axis(1))
            .map(|column| column_params(kind, column))
            .unzip();

        Self {
            kind,
            offsets: Array1::from(offsets),
            scales: Array1::from(scales),
        }
    }

    pub fn width(&self) -> usize {
        self.scales.len()
    }

    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        if matrix.ncols() != self.width() {
            return Err(AnalysisError::ShapeMismatch {
                expected: self.width(),
                actual: matrix.ncols(),
            });
        }

        // Offsets and scales broadcast across rows
        Ok((matrix - &self.offsets) * &self.scales)
    }
}

fn column_params(kind: NormalizerKind, values: ArrayView1<f64>) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }

    match kind {
        NormalizerKind::MinMax => {
            let max_abs = values.fold(0.0f64, |acc, v| acc.max(v.abs()));
            let scale = if max_abs > 0.0 { 1.0 / max_abs } else { 1.0 };
            (0.0, scale)
        }
        NormalizerKind::MeanVariance => {
            let mean = values.mean().unwrap_or(0.0);
            let std = values.std(0.0);
            let scale = if std > 0.0 { 1.0 / std } else { 1.0 };
            (mean, scale)
        }
    }
}
