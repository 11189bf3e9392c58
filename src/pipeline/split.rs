//! Random train/test partitioning

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::error::{AnalysisError, Result};

/// Number of test rows for a table of `rows` rows
pub fn test_row_count(rows: usize, test_fraction: f64) -> usize {
    ((rows as f64) * test_fraction).round() as usize
}

/// Randomly partition rows into (train, test).
///
/// The partition depends only on `seed` (a ChaCha8 stream, stable across
/// platforms and releases), so a run is reproducible. Row order
/// inside each part follows the shuffled order.
pub fn train_test_split(
    df: &DataFrame,
    test_fraction: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(AnalysisError::InvalidConfig(format!(
            "test fraction must be between 0 and 1 (exclusive), got {}",
            test_fraction
        )));
    }

    let rows = df.height();
    let mut indices: Vec<IdxSize> = (0..rows as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = test_row_count(rows, test_fraction);
    let (test_idx, train_idx) = indices.split_at(n_test);

    let train = df.take(&IdxCa::from_vec("idx".into(), train_idx.to_vec()))?;
    let test = df.take(&IdxCa::from_vec("idx".into(), test_idx.to_vec()))?;

    log::debug!(
        "Split {} row(s) into {} train / {} test (seed {})",
        rows,
        train.height(),
        test.height(),
        seed
    );

    Ok((train, test))
}
