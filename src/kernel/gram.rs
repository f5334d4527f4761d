//! Gram matrix construction
//!
//! K[i, j] = kernel(x_i, x_j). Only the upper triangle (diagonal included) is
//! evaluated; the lower triangle is mirrored from it, halving the number of
//! kernel evaluations for expensive families.

use crate::kernel::Kernel;
use nalgebra::DMatrix;

/// Build the Gram matrix by evaluating the upper triangle and mirroring it
///
/// An empty sample set yields a 0 x 0 matrix; solvers reject it.
pub fn upper_triangle_gram<K: Kernel + ?Sized>(kernel: &K, samples: &[Vec<f64>]) -> DMatrix<f64> {
    let n = samples.len();
    let mut gram = DMatrix::zeros(n, n);

    for i in 0..n {
        for j in i..n {
            let value = kernel.compute(&samples[i], &samples[j]);
            gram[(i, j)] = value;
            gram[(j, i)] = value;
        }
    }

    gram
}

/// Row-major samples as an n x m matrix
pub fn design_matrix(samples: &[Vec<f64>]) -> DMatrix<f64> {
    let m = samples.first().map_or(0, Vec::len);
    DMatrix::from_fn(samples.len(), m, |i, j| samples[i][j])
}
