//! K-fold partitioning
//!
//! Splits the data into K folds whose sizes differ by at most one. Each fold
//! is used once as validation while the K-1 remaining folds form the
//! training set.

use crate::core::{KMethodError, Result};
use crate::data::Dataset;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, PartialEq)]
pub struct KFold {
    /// Number of folds
    pub n_splits: usize,
    /// Seed of the permutation applied before splitting, if any
    pub shuffle_seed: Option<u64>,
}

impl KFold {
    /// Create a new K-fold splitter (`n_splits` must be at least 2)
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits < 2 {
            return Err(KMethodError::InvalidParameter(format!(
                "number of folds must be at least 2, got {n_splits}"
            )));
        }
        Ok(Self {
            n_splits,
            shuffle_seed: None,
        })
    }

    /// Shuffle sample order with the given seed before splitting
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Train and validation indices of `fold` for `n_samples` samples
    pub fn split(&self, fold: usize, n_samples: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        if fold >= self.n_splits {
            return Err(KMethodError::InvalidParameter(format!(
                "fold {fold} is out of range [0, {})",
                self.n_splits
            )));
        }
        if n_samples < self.n_splits {
            return Err(KMethodError::InvalidParameter(format!(
                "cannot split {n_samples} samples into {} folds",
                self.n_splits
            )));
        }

        let order = self.order(n_samples);

        let base = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;
        // the first `remainder` folds carry one extra sample
        let start = fold * base + fold.min(remainder);
        let end = start + base + usize::from(fold < remainder);

        let validation = order[start..end].to_vec();
        let mut train = Vec::with_capacity(n_samples - validation.len());
        train.extend_from_slice(&order[..start]);
        train.extend_from_slice(&order[end..]);

        Ok((train, validation))
    }

    /// All (train, validation) dataset pairs, in fold order
    pub fn folds(&self, dataset: &Dataset) -> Result<Vec<(Dataset, Dataset)>> {
        (0..self.n_splits)
            .map(|fold| {
                let (train, validation) = self.split(fold, dataset.len())?;
                Ok((dataset.select(&train), dataset.select(&validation)))
            })
            .collect()
    }

    fn order(&self, n_samples: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n_samples).collect();
        if let Some(seed) = self.shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }
        order
    }
}
