//! Kernel trait definition

use crate::kernel::gram;
use nalgebra::DMatrix;

/// Kernel function trait
///
/// A kernel function K(x, y) must satisfy Mercer's condition (symmetric,
/// positive semi-definite) for the Gram matrices built from it to be valid
/// inputs to the ridge-regression and SVM solvers.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[f64], y: &[f64]) -> f64;

    /// Symmetric n x n Gram matrix over the rows of `samples`
    ///
    /// The default evaluates the upper triangle only and mirrors it.
    fn gram(&self, samples: &[Vec<f64>]) -> DMatrix<f64> {
        gram::upper_triangle_gram(self, samples)
    }

    /// Rectangular matrix with entry (i, j) = K(rows[i], cols[j])
    fn cross_gram(&self, rows: &[Vec<f64>], cols: &[Vec<f64>]) -> DMatrix<f64> {
        DMatrix::from_fn(rows.len(), cols.len(), |i, j| {
            self.compute(&rows[i], &cols[j])
        })
    }
}
