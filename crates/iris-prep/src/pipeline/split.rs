//! Train/test partitioning.
//!
//! Rows are shuffled with a seeded Fisher–Yates permutation and cut at
//! `round(n * (1 - test_fraction))`. The same index vector gathers both the
//! features and the labels, so a feature row and its label always land in the
//! same partition.
//!
//! # Reproducibility
//!
//! The permutation is fixed as:
//!
//! ```text
//! rng = rand::rngs::StdRng::seed_from_u64(seed)      // rand 0.8
//! idx = [0, 1, ..., n - 1]
//! for i in (1..n).rev():
//!     j = rng.gen_range(0..=i)
//!     idx.swap(i, j)
//! ```
//!
//! Changing the `rand` major/minor version may change `StdRng`, which would
//! change every split produced for a given seed.

use crate::error::{PrepError, Result, ResultExt};
use crate::types::{SplitIndices, SplitResult};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Seeded permutation of `0..n`.
pub fn seeded_permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        indices.swap(i, j);
    }
    indices
}

/// Number of training rows for `n` rows and the given test fraction.
///
/// Rounds half away from zero.
pub fn train_size(n: usize, test_fraction: f64) -> usize {
    let size = (n as f64 * (1.0 - test_fraction)).round() as usize;
    size.min(n)
}

fn check_fraction(test_fraction: f64) -> Result<()> {
    if test_fraction > 0.0 && test_fraction < 1.0 {
        Ok(())
    } else {
        Err(PrepError::InvalidConfig(format!(
            "test fraction must be strictly between 0 and 1, got {}",
            test_fraction
        )))
    }
}

impl SplitIndices {
    /// Shuffle `0..n` with `seed` and cut it into train and test indices.
    pub fn compute(n: usize, test_fraction: f64, seed: u64) -> Result<Self> {
        check_fraction(test_fraction)?;

        let mut permuted = seeded_permutation(n, seed);
        let test = permuted.split_off(train_size(n, test_fraction));
        Ok(Self {
            train: permuted,
            test,
        })
    }
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    df.take(&idx)
        .context(format!("gathering {} rows", indices.len()))
}

/// Partitions a feature matrix and label vector into train and test sets.
pub struct DatasetSplitter;

impl DatasetSplitter {
    /// Split `features` and `labels` into four owned frames.
    ///
    /// Inputs are not modified.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `test_fraction` is not in (0, 1), `RowCountMismatch`
    /// if the two frames have different heights.
    pub fn split(
        features: &DataFrame,
        labels: &DataFrame,
        test_fraction: f64,
        seed: u64,
    ) -> Result<SplitResult> {
        check_fraction(test_fraction)?;

        if features.height() != labels.height() {
            return Err(PrepError::RowCountMismatch {
                features: features.height(),
                labels: labels.height(),
            });
        }

        let n = features.height();
        let indices = SplitIndices::compute(n, test_fraction, seed)?;
        debug!(
            "Permuted {} rows with seed {}: {} train / {} test",
            n,
            seed,
            indices.train.len(),
            indices.test.len()
        );

        let result = SplitResult {
            x_train: take_rows(features, &indices.train)?,
            x_test: take_rows(features, &indices.test)?,
            y_train: take_rows(labels, &indices.train)?,
            y_test: take_rows(labels, &indices.test)?,
            indices,
        };

        info!(
            "Data split into training ({} rows) and test ({} rows) sets",
            result.train_rows(),
            result.test_rows()
        );
        Ok(result)
    }
}
