//! Iteratively reweighted least squares (IRLS) for kernel logistic regression
//!
//! Starting from alpha = 0, each iteration computes the margins m = K alpha,
//! the weights w_i = σ(y_i m_i)·σ(-y_i m_i), the pseudo-responses
//! z_i = m_i + y_i / σ(-y_i m_i), and re-solves the weighted kernel ridge
//! regression for a new alpha. Iteration stops once ‖alpha_new - alpha‖ ≤ tol
//! or the iteration budget is spent.

use crate::core::{sigmoid, FitStatus, KMethodError, Result};
use crate::solver::wkrr::WeightedKernelRidge;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

/// Sigmoid outputs are clamped to [SIGMOID_FLOOR, 1 - SIGMOID_FLOOR]
pub const SIGMOID_FLOOR: f64 = 1e-12;

/// IRLS driver; the Gram matrix is supplied by the caller and reused for every iteration
#[derive(Debug, Clone)]
pub struct IrlsSolver {
    ridge: WeightedKernelRidge,
    max_iterations: usize,
    tolerance: f64,
}

/// Result of an IRLS run
#[derive(Debug, Clone)]
pub struct IrlsOutcome {
    /// Dual coefficients, one per training sample
    pub alpha: DVector<f64>,
    /// Iterations performed
    pub iterations: usize,
    pub status: FitStatus,
    /// ‖alpha_t - alpha_{t-1}‖ for every iteration
    pub deltas: Vec<f64>,
    /// Number of (iteration, sample) pairs whose sigmoid had to be clamped
    pub clamped: usize,
}

impl IrlsSolver {
    pub fn new(lambda: f64, max_iterations: usize, tolerance: f64) -> Result<Self> {
        if max_iterations == 0 {
            return Err(KMethodError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(tolerance >= 0.0 && tolerance.is_finite()) {
            return Err(KMethodError::InvalidParameter(format!(
                "tolerance must be non-negative, got {tolerance}"
            )));
        }
        Ok(Self {
            ridge: WeightedKernelRidge::new(lambda)?,
            max_iterations,
            tolerance,
        })
    }

    /// Run IRLS on a Gram matrix and labels in {-1, +1}
    pub fn solve(&self, gram: &DMatrix<f64>, labels: &[f64]) -> Result<IrlsOutcome> {
        let n = gram.nrows();
        if n == 0 {
            return Err(KMethodError::EmptyDataset);
        }
        if labels.len() != n {
            return Err(KMethodError::DimensionMismatch {
                expected: n,
                actual: labels.len(),
            });
        }
        if let Some(bad) = labels.iter().find(|&&y| y != 1.0 && y != -1.0) {
            return Err(KMethodError::InvalidLabels(format!(
                "IRLS expects labels in {{-1, +1}}, got {bad}"
            )));
        }

        let y = DVector::from_column_slice(labels);
        let mut alpha = DVector::zeros(n);
        let mut deltas = Vec::new();
        let mut clamped = 0;

        for iteration in 1..=self.max_iterations {
            let margins = gram * &alpha;
            let step = newton_step(&margins, &y);
            clamped += step.clamped;

            let new_alpha = self.ridge.solve(gram, &step.weights, &step.pseudo_response)?;
            let delta = (&new_alpha - &alpha).norm();
            deltas.push(delta);
            alpha = new_alpha;

            debug!("IRLS iteration {iteration}: |delta alpha| = {delta:.3e}");

            if delta <= self.tolerance {
                report_clamping(clamped);
                return Ok(IrlsOutcome {
                    alpha,
                    iterations: iteration,
                    status: FitStatus::Converged,
                    deltas,
                    clamped,
                });
            }
        }

        warn!(
            "IRLS did not reach tolerance {:e} within {} iterations (last step {:.3e})",
            self.tolerance,
            self.max_iterations,
            deltas.last().copied().unwrap_or(f64::NAN)
        );
        report_clamping(clamped);

        Ok(IrlsOutcome {
            alpha,
            iterations: self.max_iterations,
            status: FitStatus::IterationBudgetExhausted,
            deltas,
            clamped,
        })
    }
}

struct NewtonStep {
    weights: DVector<f64>,
    pseudo_response: DVector<f64>,
    clamped: usize,
}

/// Weights and pseudo-responses for the current margins
fn newton_step(margins: &DVector<f64>, y: &DVector<f64>) -> NewtonStep {
    let n = margins.len();
    let mut weights = DVector::zeros(n);
    let mut pseudo_response = DVector::zeros(n);
    let mut clamped = 0;

    for i in 0..n {
        let ym = y[i] * margins[i];
        let raw_pos = sigmoid(ym);
        let raw_neg = sigmoid(-ym);
        let pos = raw_pos.clamp(SIGMOID_FLOOR, 1.0 - SIGMOID_FLOOR);
        let neg = raw_neg.clamp(SIGMOID_FLOOR, 1.0 - SIGMOID_FLOOR);
        if pos != raw_pos || neg != raw_neg {
            clamped += 1;
        }

        weights[i] = pos * neg;
        pseudo_response[i] = margins[i] + y[i] / neg;
    }

    NewtonStep {
        weights,
        pseudo_response,
        clamped,
    }
}

fn report_clamping(clamped: usize) {
    if clamped > 0 {
        warn!("sigmoid clamped to [{SIGMOID_FLOOR:e}, 1 - {SIGMOID_FLOOR:e}] for {clamped} sample updates (extreme margins)");
    }
}
