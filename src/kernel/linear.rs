//! Linear kernel implementation

use crate::kernel::gram::design_matrix;
use crate::kernel::Kernel;
use nalgebra::DMatrix;

/// Linear kernel: K(x, y) = x^T * y
///
/// This is the simplest kernel function, computing the dot product between two vectors.
/// Its Gram matrix is computed in one bulk product X * X^T.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    /// Create a new linear kernel
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        dot(x, y)
    }

    fn gram(&self, samples: &[Vec<f64>]) -> DMatrix<f64> {
        let x = design_matrix(samples);
        let mut gram = &x * x.transpose();
        // blocked products do not guarantee bitwise symmetry
        gram.fill_lower_triangle_with_upper_triangle();
        gram
    }
}

/// Dot product of two dense vectors
pub(crate) fn dot(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len(), "vectors must have the same dimension");
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}
