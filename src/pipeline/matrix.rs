//! Dense feature matrices
//!
//! A feature matrix is an `ndarray::Array2<f64>` with one row per record and
//! one column per layout slot. The helpers here build and rearrange them.

use ndarray::{concatenate, Array2, ArrayView2, Axis};

use super::error::{AnalysisError, Result};

/// Records × feature slots
pub type FeatureMatrix = Array2<f64>;

/// Build from per-row vectors. All rows must have the same width.
pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<FeatureMatrix> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if let Some(ragged) = rows.iter().find(|r| r.len() != n_cols) {
        return Err(AnalysisError::ShapeMismatch {
            expected: n_cols,
            actual: ragged.len(),
        });
    }

    let data: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), data).map_err(|_| AnalysisError::ShapeMismatch {
        expected: n_rows * n_cols,
        actual: 0,
    })
}

/// Place blocks side by side. Every block must have the same row count.
pub fn hstack(blocks: &[FeatureMatrix]) -> Result<FeatureMatrix> {
    let Some(first) = blocks.first() else {
        return Ok(Array2::zeros((0, 0)));
    };
    if let Some(block) = blocks.iter().find(|b| b.nrows() != first.nrows()) {
        return Err(AnalysisError::ShapeMismatch {
            expected: first.nrows(),
            actual: block.nrows(),
        });
    }

    let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
    concatenate(Axis(1), &views).map_err(|_| AnalysisError::ShapeMismatch {
        expected: first.nrows(),
        actual: 0,
    })
}

/// Copy with the given columns' values reordered across rows:
/// row `r` receives the values of row `permutation[r]`.
pub fn with_permuted_columns(
    features: &FeatureMatrix,
    columns: &[usize],
    permutation: &[usize],
) -> FeatureMatrix {
    let mut out = features.clone();
    for &c in columns {
        let shuffled = features.column(c).select(Axis(0), permutation);
        out.column_mut(c).assign(&shuffled);
    }
    out
}
