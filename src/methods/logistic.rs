//! Kernel logistic regression fitted by IRLS

use crate::core::{FitSummary, KMethodError, KernelMethod, Result};
use crate::data::{labels, Dataset};
use crate::kernel::{Kernel, KernelSpec};
use crate::methods::model::{training_features, DualModel};
use crate::solver::{IrlsOutcome, IrlsSolver};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Hyperparameters of kernel logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub kernel: KernelSpec,
    /// Ridge regularization strength (lambda > 0)
    pub lambda: f64,
    pub max_iterations: usize,
    /// Stop once ‖Δalpha‖ ≤ tolerance
    pub tolerance: f64,
    /// Standardize features before fitting
    pub scale: bool,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            kernel: KernelSpec::default(),
            lambda: 1.0,
            max_iterations: 100,
            tolerance: 1e-5,
            scale: false,
        }
    }
}

impl LogisticConfig {
    pub fn with_kernel(mut self, kernel: KernelSpec) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }
}

/// Binary classifier with score(x) = Σ alpha_i k(x_i, x) and no intercept
#[derive(Debug, Clone)]
pub struct KernelLogisticRegression {
    config: LogisticConfig,
    solver: IrlsSolver,
    model: DualModel,
    outcome: Option<IrlsOutcome>,
}

impl KernelLogisticRegression {
    /// # Errors
    /// `InvalidParameter` for bad kernel or iteration settings, `SingularSystem` for lambda ≤ 0.
    pub fn new(config: LogisticConfig) -> Result<Self> {
        let kernel = config.kernel.build()?;
        let solver = IrlsSolver::new(config.lambda, config.max_iterations, config.tolerance)?;
        Ok(Self {
            config,
            solver,
            model: DualModel::new(kernel),
            outcome: None,
        })
    }

    pub fn config(&self) -> &LogisticConfig {
        &self.config
    }

    /// Dual coefficients of the last fit
    pub fn alpha(&self) -> Result<&[f64]> {
        self.model.alpha()
    }

    /// Always 0 once fitted
    pub fn bias(&self) -> Result<f64> {
        self.model.bias()
    }

    /// Convergence trace of the last fit
    pub fn irls_outcome(&self) -> Result<&IrlsOutcome> {
        self.outcome.as_ref().ok_or(KMethodError::ModelNotTrained)
    }
}

impl KernelMethod for KernelLogisticRegression {
    fn name(&self) -> &'static str {
        "klr"
    }

    fn fit(&mut self, dataset: &Dataset) -> Result<FitSummary> {
        self.model.reset();
        self.outcome = None;

        let start = Instant::now();
        info!(
            "Fitting kernel logistic regression ({}, lambda={}) on {}",
            self.config.kernel, self.config.lambda, dataset
        );

        let y = labels::normalize(dataset.labels())?;
        let (features, scaler) = training_features(dataset, self.config.scale)?;

        let gram = self.model.kernel().gram(&features);
        let outcome = self.solver.solve(&gram, &y)?;

        self.model.bind(
            features,
            outcome.alpha.iter().copied().collect(),
            0.0,
            dataset.dim(),
            scaler,
        )?;

        let summary = FitSummary::new(dataset.len(), outcome.iterations, outcome.status);
        info!(
            "IRLS finished after {} iterations ({:?}) in {:.2?}",
            outcome.iterations,
            outcome.status,
            start.elapsed()
        );
        self.outcome = Some(outcome);
        Ok(summary)
    }

    fn is_fitted(&self) -> bool {
        self.model.is_fitted()
    }

    fn predict(&self, x: &[f64]) -> Result<f64> {
        self.model.decision(x)
    }
}
