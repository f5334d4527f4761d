//! In-memory dense dataset

use crate::core::{KMethodError, Result};
use crate::data::labels;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;

/// Dense feature matrix (one row per sample) with its label vector
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<f64>,
    name: String,
}

impl Dataset {
    /// Create a dataset, checking that every row has the same dimension,
    /// that there is one label per row and that every feature is finite
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(KMethodError::DimensionMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        if let Some(first) = features.first() {
            let dim = first.len();
            if let Some(row) = features.iter().find(|row| row.len() != dim) {
                return Err(KMethodError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
        }
        for (i, row) in features.iter().enumerate() {
            if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                return Err(KMethodError::InvalidParameter(format!(
                    "non-finite feature value {} at row {i}, column {col}",
                    row[col]
                )));
            }
        }
        Ok(Self {
            features,
            labels,
            name: "Dataset".to_string(),
        })
    }

    /// Set a display name; datasets can only be concatenated with datasets of the same name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of features (0 for an empty dataset)
    pub fn dim(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Feature row and label of sample `i`
    ///
    /// # Panics
    /// Panics if `i >= len()`
    pub fn sample(&self, i: usize) -> (&[f64], f64) {
        (&self.features[i], self.labels[i])
    }

    /// Permute the rows in place with a seeded generator
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(&mut rng);
        *self = self.select(&order);
        debug!("Dataset '{}' shuffled (seed {seed})", self.name);
    }

    /// Split into (train, validation); the first `floor(fraction * n)` rows
    /// form the validation part
    pub fn split(&self, fraction: f64) -> Result<(Dataset, Dataset)> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(KMethodError::InvalidParameter(format!(
                "split fraction must be in [0, 1), got {fraction}"
            )));
        }
        let boundary = (fraction * self.len() as f64) as usize;
        let validation: Vec<usize> = (0..boundary).collect();
        let train: Vec<usize> = (boundary..self.len()).collect();
        Ok((self.select(&train), self.select(&validation)))
    }

    /// New dataset made of the given rows, in the given order
    ///
    /// # Panics
    /// Panics if an index is out of bounds
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            name: self.name.clone(),
        }
    }

    /// Append the rows of another dataset with the same name
    pub fn concat(&self, other: &Dataset) -> Result<Dataset> {
        if self.name != other.name {
            return Err(KMethodError::InvalidParameter(format!(
                "cannot concatenate '{}' with '{}'",
                self.name, other.name
            )));
        }
        if !self.is_empty() && !other.is_empty() && self.dim() != other.dim() {
            return Err(KMethodError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        let mut features = self.features.clone();
        features.extend(other.features.iter().cloned());
        let mut labels = self.labels.clone();
        labels.extend_from_slice(&other.labels);
        Ok(Dataset {
            features,
            labels,
            name: self.name.clone(),
        })
    }

    /// Copy with labels normalized to {-1, +1}
    pub fn with_signed_labels(&self) -> Result<Dataset> {
        Ok(Dataset {
            features: self.features.clone(),
            labels: labels::normalize(&self.labels)?,
            name: self.name.clone(),
        })
    }

    /// Copy with the negative-class marker swapped (-1 <-> 0)
    pub fn inverted_labels(&self) -> Result<Dataset> {
        Ok(Dataset {
            features: self.features.clone(),
            labels: labels::invert_encoding(&self.labels)?,
            name: self.name.clone(),
        })
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dataset of size ({}, {}) with {} data",
            self.len(),
            self.dim(),
            self.name
        )
    }
}
