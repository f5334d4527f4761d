//! Weighted kernel ridge regression (WKRR)
//!
//! Solves the subproblem of one IRLS iteration:
//!
//! alpha = S (n·λ·I + S K S)⁻¹ S z,  S = diag(sqrt(w))
//!
//! The weights form a diagonal matrix stored as a vector, so S is the
//! elementwise square root. With K positive semi-definite, λ > 0 and w > 0
//! the bracketed system is symmetric positive-definite and is solved by
//! Cholesky factorization.

use crate::core::{KMethodError, Result};
use nalgebra::{DMatrix, DVector};

/// WKRR solver for a fixed regularization strength
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedKernelRidge {
    lambda: f64,
}

impl WeightedKernelRidge {
    /// # Errors
    /// `SingularSystem` unless `lambda` is positive and finite
    pub fn new(lambda: f64) -> Result<Self> {
        if !(lambda > 0.0 && lambda.is_finite()) {
            return Err(KMethodError::SingularSystem(format!(
                "lambda must be positive, got {lambda}"
            )));
        }
        Ok(Self { lambda })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Solve for the dual coefficients given Gram matrix, weights and pseudo-responses
    pub fn solve(
        &self,
        gram: &DMatrix<f64>,
        weights: &DVector<f64>,
        z: &DVector<f64>,
    ) -> Result<DVector<f64>> {
        let n = gram.nrows();
        if n == 0 {
            return Err(KMethodError::EmptyDataset);
        }
        if gram.ncols() != n {
            return Err(KMethodError::DimensionMismatch {
                expected: n,
                actual: gram.ncols(),
            });
        }
        for len in [weights.len(), z.len()] {
            if len != n {
                return Err(KMethodError::DimensionMismatch {
                    expected: n,
                    actual: len,
                });
            }
        }
        if let Some(w) = weights.iter().find(|&&w| !(w > 0.0 && w.is_finite())) {
            return Err(KMethodError::SingularSystem(format!(
                "weights must be strictly positive, got {w}"
            )));
        }

        let sqrt_w = weights.map(f64::sqrt);
        let ridge = n as f64 * self.lambda;

        let mut system = DMatrix::from_fn(n, n, |i, j| sqrt_w[i] * gram[(i, j)] * sqrt_w[j]);
        for i in 0..n {
            system[(i, i)] += ridge;
        }

        let cholesky = system.cholesky().ok_or_else(|| {
            KMethodError::SingularSystem(
                "regularized system is not positive definite (is the kernel PSD?)".to_string(),
            )
        })?;

        let rhs = sqrt_w.component_mul(z);
        let solution = cholesky.solve(&rhs);
        Ok(sqrt_w.component_mul(&solution))
    }
}
