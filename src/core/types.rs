//! Core type definitions shared by the classifiers

use serde::Serialize;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: f64, decision_value: f64) -> Self {
        Self {
            label,
            decision_value,
        }
    }

    /// Build a prediction from a raw score; a score of exactly 0 is labelled +1
    pub fn from_decision(decision_value: f64) -> Self {
        Self::new(sign_label(decision_value), decision_value)
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Map a decision value to a class label, breaking ties toward +1
pub fn sign_label(decision_value: f64) -> f64 {
    if decision_value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Logistic function, evaluated without overflow for large |x|
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// How a fit terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitStatus {
    /// Stopping criterion met
    Converged,
    /// Ran out of iterations; the model is usable but may be under-converged
    IterationBudgetExhausted,
}

impl FitStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, FitStatus::Converged)
    }
}

/// Summary returned by every `fit` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    /// Number of training samples bound to the model
    pub n_samples: usize,
    /// Solver iterations performed
    pub iterations: usize,
    /// Termination state of the solver
    pub status: FitStatus,
}

impl FitSummary {
    pub fn new(n_samples: usize, iterations: usize, status: FitStatus) -> Self {
        Self {
            n_samples,
            iterations,
            status,
        }
    }
}
