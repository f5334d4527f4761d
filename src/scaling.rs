//! Per-column standardization of dense features

use crate::core::{KMethodError, Result};

/// Columns with a standard deviation below this are only centred
const CONSTANT_FEATURE_STD: f64 = 1e-12;

/// Z-score scaler: (x - mean) / std, with the population standard deviation
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Compute column statistics from training rows
    pub fn fit(features: &[Vec<f64>]) -> Result<Self> {
        let first = features.first().ok_or(KMethodError::EmptyDataset)?;
        let dim = first.len();
        let n = features.len() as f64;

        let mut means = vec![0.0; dim];
        for row in features {
            if row.len() != dim {
                return Err(KMethodError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            for (mean, &value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        means.iter_mut().for_each(|mean| *mean /= n);

        let mut stds = vec![0.0; dim];
        for row in features {
            for ((var, &value), &mean) in stds.iter_mut().zip(row).zip(&means) {
                *var += (value - mean).powi(2);
            }
        }
        stds.iter_mut().for_each(|var| *var = (*var / n).sqrt());

        Ok(Self { means, stds })
    }

    pub fn dim(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Scale a single row
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.dim() {
            return Err(KMethodError::DimensionMismatch {
                expected: self.dim(),
                actual: x.len(),
            });
        }
        Ok(x.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(&value, (&mean, &std))| {
                if std < CONSTANT_FEATURE_STD {
                    value - mean
                } else {
                    (value - mean) / std
                }
            })
            .collect())
    }

    pub fn transform_all(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        features.iter().map(|row| self.transform(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_columns_are_standardized() {
        let rows = vec![vec![1.0, 10.0], vec![3.0, 10.0], vec![5.0, 10.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();

        assert_eq!(scaler.means(), &[3.0, 10.0]);
        assert_relative_eq!(scaler.stds()[0], (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);

        let scaled = scaler.transform_all(&rows).unwrap();
        let column: Vec<f64> = scaled.iter().map(|r| r[0]).collect();
        assert_relative_eq!(column.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            column.iter().map(|v| v * v).sum::<f64>() / 3.0,
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_constant_column_is_only_centred() {
        let scaler = StandardScaler::fit(&[vec![2.0], vec![2.0]]).unwrap();
        assert_eq!(scaler.transform(&[5.0]).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            StandardScaler::fit(&[]),
            Err(KMethodError::EmptyDataset)
        ));
        assert!(StandardScaler::fit(&[vec![1.0], vec![1.0, 2.0]]).is_err());

        let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&[1.0]),
            Err(KMethodError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
