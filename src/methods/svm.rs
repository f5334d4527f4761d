//! Kernel C-SVM trained with SMO

use crate::core::{FitSummary, KernelMethod, Result};
use crate::data::{labels, Dataset};
use crate::kernel::KernelSpec;
use crate::methods::model::{training_features, DualModel};
use crate::solver::{SMOSolver, SmoConfig};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Hyperparameters of the kernel SVM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    pub kernel: KernelSpec,
    /// Upper bound of the Lagrange multipliers
    pub c: f64,
    /// KKT tolerance
    pub epsilon: f64,
    pub max_iterations: usize,
    /// Kernel cache budget in bytes
    pub cache_size: usize,
    pub scale: bool,
}

impl Default for SvmConfig {
    fn default() -> Self {
        let smo = SmoConfig::default();
        Self {
            kernel: KernelSpec::default(),
            c: smo.c,
            epsilon: smo.epsilon,
            max_iterations: smo.max_iterations,
            cache_size: smo.cache_size,
            scale: false,
        }
    }
}

impl SvmConfig {
    pub fn with_kernel(mut self, kernel: KernelSpec) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    fn smo(&self) -> SmoConfig {
        SmoConfig {
            c: self.c,
            epsilon: self.epsilon,
            max_iterations: self.max_iterations,
            cache_size: self.cache_size,
        }
    }
}

/// Support vector classifier; stores alpha_i·y_i for the support vectors only
#[derive(Debug, Clone)]
pub struct KernelSVM {
    config: SvmConfig,
    model: DualModel,
    support_indices: Vec<usize>,
}

impl KernelSVM {
    pub fn new(config: SvmConfig) -> Result<Self> {
        let kernel = config.kernel.build()?;
        // fail early on bad C / epsilon
        SMOSolver::new(&kernel, config.smo())?;
        Ok(Self {
            config,
            model: DualModel::new(kernel),
            support_indices: Vec::new(),
        })
    }

    pub fn config(&self) -> &SvmConfig {
        &self.config
    }

    /// Coefficients alpha_i·y_i of the support vectors
    pub fn dual_coefficients(&self) -> Result<&[f64]> {
        self.model.alpha()
    }

    pub fn bias(&self) -> Result<f64> {
        self.model.bias()
    }

    pub fn support_vectors(&self) -> Result<&[Vec<f64>]> {
        self.model.points()
    }

    /// Positions of the support vectors in the training set
    pub fn support_indices(&self) -> &[usize] {
        &self.support_indices
    }
}

impl KernelMethod for KernelSVM {
    fn name(&self) -> &'static str {
        "svm"
    }

    fn fit(&mut self, dataset: &Dataset) -> Result<FitSummary> {
        self.model.reset();
        self.support_indices.clear();

        let start = Instant::now();
        info!(
            "Fitting kernel SVM ({}, C={}) on {}",
            self.config.kernel, self.config.c, dataset
        );

        let y = labels::normalize(dataset.labels())?;
        let (features, scaler) = training_features(dataset, self.config.scale)?;

        let solver = SMOSolver::new(self.model.kernel(), self.config.smo())?;
        let outcome = solver.solve(&features, &y)?;

        let points = outcome
            .support
            .iter()
            .map(|&i| features[i].clone())
            .collect();
        let coefficients = outcome
            .support
            .iter()
            .map(|&i| outcome.alpha[i] * y[i])
            .collect();
        self.model
            .bind(points, coefficients, outcome.bias, dataset.dim(), scaler)?;

        info!(
            "SMO finished after {} passes ({:?}): {} support vectors, bias {:.6}, {:.2?}",
            outcome.iterations,
            outcome.status,
            outcome.support.len(),
            outcome.bias,
            start.elapsed()
        );
        self.support_indices = outcome.support;

        Ok(FitSummary::new(
            dataset.len(),
            outcome.iterations,
            outcome.status,
        ))
    }

    fn is_fitted(&self) -> bool {
        self.model.is_fitted()
    }

    fn predict(&self, x: &[f64]) -> Result<f64> {
        self.model.decision(x)
    }
}
