//! Sequential Minimal Optimization (SMO) for the C-SVM dual
//!
//! Repeatedly optimizes pairs of Lagrange multipliers; the second multiplier
//! is chosen to maximize |E_i - E_j|. Kernel values come from an LRU cache.

use crate::cache::KernelCache;
use crate::core::{FitStatus, KMethodError, Result};
use crate::kernel::Kernel;
use log::{debug, warn};

/// Configuration of the SMO solver
#[derive(Debug, Clone, PartialEq)]
pub struct SmoConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Tolerance for KKT conditions
    pub epsilon: f64,
    /// Maximum number of passes over the data
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
}

impl Default for SmoConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 1e-3,
            max_iterations: 10_000,
            cache_size: 100_000_000,
        }
    }
}

/// Result of an SMO run
#[derive(Debug, Clone)]
pub struct SmoOutcome {
    /// Lagrange multipliers, one per training sample
    pub alpha: Vec<f64>,
    /// Bias term
    pub bias: f64,
    /// Indices with alpha > epsilon
    pub support: Vec<usize>,
    pub iterations: usize,
    pub status: FitStatus,
}

/// SMO solver over dense samples
pub struct SMOSolver<'k, K: Kernel + ?Sized> {
    kernel: &'k K,
    config: SmoConfig,
}

struct State<'s> {
    samples: &'s [Vec<f64>],
    labels: &'s [f64],
    alpha: Vec<f64>,
    errors: Vec<f64>,
    cache: KernelCache,
}

impl<'k, K: Kernel + ?Sized> SMOSolver<'k, K> {
    pub fn new(kernel: &'k K, config: SmoConfig) -> Result<Self> {
        if !(config.c > 0.0 && config.c.is_finite()) {
            return Err(KMethodError::InvalidParameter(format!(
                "C must be positive, got {}",
                config.c
            )));
        }
        if !(config.epsilon > 0.0) {
            return Err(KMethodError::InvalidParameter(format!(
                "epsilon must be positive, got {}",
                config.epsilon
            )));
        }
        Ok(Self { kernel, config })
    }

    /// Solve the dual problem for samples with labels in {-1, +1}
    pub fn solve(&self, samples: &[Vec<f64>], labels: &[f64]) -> Result<SmoOutcome> {
        if samples.is_empty() {
            return Err(KMethodError::EmptyDataset);
        }
        if samples.len() != labels.len() {
            return Err(KMethodError::DimensionMismatch {
                expected: samples.len(),
                actual: labels.len(),
            });
        }
        if let Some(bad) = labels.iter().find(|&&y| y != 1.0 && y != -1.0) {
            return Err(KMethodError::InvalidLabels(format!(
                "SMO expects labels in {{-1, +1}}, got {bad}"
            )));
        }

        let n = samples.len();

        // A single class has no separating boundary: predict it everywhere
        if labels.iter().all(|&y| y == labels[0]) {
            warn!("only one class present; fitting a constant classifier");
            return Ok(SmoOutcome {
                alpha: vec![0.0; n],
                bias: labels[0],
                support: Vec::new(),
                iterations: 0,
                status: FitStatus::Converged,
            });
        }

        // Initially every output is 0, so E_i = -y_i
        let mut state = State {
            samples,
            labels,
            alpha: vec![0.0; n],
            errors: labels.iter().map(|&y| -y).collect(),
            cache: KernelCache::with_memory_limit(self.config.cache_size),
        };

        let mut iterations = 0;
        let mut num_changed = 0;
        let mut examine_all = true;

        while (num_changed > 0 || examine_all) && iterations < self.config.max_iterations {
            num_changed = 0;

            for i in 0..n {
                let bound = state.alpha[i] <= 0.0 || state.alpha[i] >= self.config.c;
                if (examine_all || !bound) && self.examine_example(i, &mut state) {
                    num_changed += 1;
                }
            }

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }

            iterations += 1;
            debug!("SMO pass {iterations}: {num_changed} multipliers changed");
        }

        let status = if num_changed == 0 && !examine_all {
            FitStatus::Converged
        } else {
            warn!(
                "SMO stopped after {} passes without meeting the KKT tolerance",
                self.config.max_iterations
            );
            FitStatus::IterationBudgetExhausted
        };

        let bias = self.calculate_bias(&state);
        let support = state
            .alpha
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a > self.config.epsilon)
            .map(|(i, _)| i)
            .collect();

        let stats = state.cache.stats();
        debug!(
            "kernel cache: {} hits, {} misses ({:.1}% hit rate)",
            stats.hits,
            stats.misses,
            stats.hit_rate * 100.0
        );

        Ok(SmoOutcome {
            alpha: state.alpha,
            bias,
            support,
            iterations,
            status,
        })
    }

    fn kernel_value(&self, state: &mut State<'_>, i: usize, j: usize) -> f64 {
        let samples = state.samples;
        state
            .cache
            .get_or_insert_with(i, j, || self.kernel.compute(&samples[i], &samples[j]))
    }

    /// Examine a single example; returns whether a pair was optimized
    fn examine_example(&self, i: usize, state: &mut State<'_>) -> bool {
        let r_i = state.errors[i] * state.labels[i];
        let alpha_i = state.alpha[i];

        // KKT violation: r_i < -eps with room to grow, or r_i > eps with room to shrink
        let violates = (r_i < -self.config.epsilon && alpha_i < self.config.c)
            || (r_i > self.config.epsilon && alpha_i > 0.0);
        if !violates {
            return false;
        }

        match self.select_second_variable(i, state) {
            Some(j) => self.take_step(i, j, state),
            None => false,
        }
    }

    /// Maximum |E_i - E_j|
    fn select_second_variable(&self, i: usize, state: &State<'_>) -> Option<usize> {
        let e_i = state.errors[i];
        let mut best_j = None;
        let mut max_diff = 0.0;

        for (j, &e_j) in state.errors.iter().enumerate() {
            if j == i {
                continue;
            }
            let diff = (e_i - e_j).abs();
            if diff > max_diff {
                max_diff = diff;
                best_j = Some(j);
            }
        }

        best_j
    }

    /// Jointly optimize alpha_i and alpha_j
    fn take_step(&self, i: usize, j: usize, state: &mut State<'_>) -> bool {
        let c = self.config.c;
        let y_i = state.labels[i];
        let y_j = state.labels[j];
        let alpha_i_old = state.alpha[i];
        let alpha_j_old = state.alpha[j];
        let e_i = state.errors[i];
        let e_j = state.errors[j];

        let (low, high) = if y_i != y_j {
            let diff = alpha_j_old - alpha_i_old;
            (0.0_f64.max(diff), c.min(c + diff))
        } else {
            let sum = alpha_i_old + alpha_j_old;
            (0.0_f64.max(sum - c), c.min(sum))
        };

        if low >= high {
            return false;
        }

        let k_ii = self.kernel_value(state, i, i);
        let k_ij = self.kernel_value(state, i, j);
        let k_jj = self.kernel_value(state, j, j);

        let eta = k_ii + k_jj - 2.0 * k_ij;
        if eta <= 0.0 {
            // objective is not strictly convex along this pair
            return false;
        }

        let alpha_j_new = (alpha_j_old + y_j * (e_i - e_j) / eta).clamp(low, high);

        if (alpha_j_new - alpha_j_old).abs()
            < self.config.epsilon * (alpha_j_new + alpha_j_old + self.config.epsilon)
        {
            return false;
        }

        let alpha_i_new = alpha_i_old + y_i * y_j * (alpha_j_old - alpha_j_new);
        state.alpha[i] = alpha_i_new;
        state.alpha[j] = alpha_j_new;

        let delta_i = y_i * (alpha_i_new - alpha_i_old);
        let delta_j = y_j * (alpha_j_new - alpha_j_old);

        for k in 0..state.samples.len() {
            let k_ik = self.kernel_value(state, i, k);
            let k_jk = self.kernel_value(state, j, k);
            state.errors[k] += delta_i * k_ik + delta_j * k_jk;
        }

        true
    }

    /// Bias from the margin support vectors (0 < alpha < C), falling back to all of them
    fn calculate_bias(&self, state: &State<'_>) -> f64 {
        let eps = self.config.epsilon;
        let c = self.config.c;

        let mean_error = |filter: &dyn Fn(f64) -> bool| {
            let (sum, count) = state
                .alpha
                .iter()
                .zip(&state.errors)
                .filter(|&(&a, _)| filter(a))
                .fold((0.0, 0usize), |(s, n), (_, &e)| (s + e, n + 1));
            (count > 0).then(|| sum / count as f64)
        };

        mean_error(&|a| a > eps && a < c - eps)
            .or_else(|| mean_error(&|a| a > eps))
            .map_or(0.0, |mean| -mean)
    }
}
