//! k-nearest neighbours under the kernel-induced distance
//!
//! d²(x, z) = k(x, x) + k(z, z) - 2 k(x, z)

use crate::core::{FitStatus, FitSummary, KMethodError, KernelMethod, Result};
use crate::data::{labels, Dataset};
use crate::kernel::{Kernel, KernelFunction, KernelSpec};
use crate::methods::model::{prepare_input, training_features};
use crate::scaling::StandardScaler;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Hyperparameters of kernel KNN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    pub kernel: KernelSpec,
    pub n_neighbors: usize,
    pub scale: bool,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self {
            kernel: KernelSpec::default(),
            n_neighbors: 5,
            scale: false,
        }
    }
}

impl KnnConfig {
    pub fn with_kernel(mut self, kernel: KernelSpec) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Debug, Clone)]
struct Memory {
    points: Vec<Vec<f64>>,
    labels: Vec<f64>,
    /// k(x_i, x_i) for every stored point
    self_similarity: Vec<f64>,
    dim: usize,
    scaler: Option<StandardScaler>,
}

/// Lazy learner: `fit` memorizes the training set
#[derive(Debug, Clone)]
pub struct KernelKNN {
    config: KnnConfig,
    kernel: KernelFunction,
    memory: Option<Memory>,
}

impl KernelKNN {
    pub fn new(config: KnnConfig) -> Result<Self> {
        if config.n_neighbors == 0 {
            return Err(KMethodError::InvalidParameter(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            kernel: config.kernel.build()?,
            config,
            memory: None,
        })
    }

    pub fn config(&self) -> &KnnConfig {
        &self.config
    }

    /// Labels of the nearest stored points, closest first
    pub fn neighbors(&self, x: &[f64]) -> Result<Vec<f64>> {
        let memory = self.memory.as_ref().ok_or(KMethodError::ModelNotTrained)?;
        let x = prepare_input(memory.dim, memory.scaler.as_ref(), x)?;
        let k_xx = self.kernel.compute(&x, &x);

        let mut distances: Vec<(f64, usize)> = memory
            .points
            .iter()
            .zip(&memory.self_similarity)
            .enumerate()
            .map(|(i, (point, &k_pp))| (k_xx + k_pp - 2.0 * self.kernel.compute(point, &x), i))
            .collect();
        // stable sort keeps training order among ties
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));

        let k = self.config.n_neighbors.min(distances.len());
        Ok(distances[..k]
            .iter()
            .map(|&(_, i)| memory.labels[i])
            .collect())
    }
}

impl KernelMethod for KernelKNN {
    fn name(&self) -> &'static str {
        "knn"
    }

    fn fit(&mut self, dataset: &Dataset) -> Result<FitSummary> {
        self.memory = None;

        let y = labels::normalize(dataset.labels())?;
        let (points, scaler) = training_features(dataset, self.config.scale)?;

        if self.config.n_neighbors > points.len() {
            warn!(
                "n_neighbors={} exceeds the {} training points; using all of them",
                self.config.n_neighbors,
                points.len()
            );
        }

        let self_similarity = points.iter().map(|p| self.kernel.compute(p, p)).collect();
        self.memory = Some(Memory {
            points,
            labels: y,
            self_similarity,
            dim: dataset.dim(),
            scaler,
        });

        info!(
            "Kernel KNN ({}, k={}) memorized {}",
            self.config.kernel, self.config.n_neighbors, dataset
        );
        Ok(FitSummary::new(dataset.len(), 0, FitStatus::Converged))
    }

    fn is_fitted(&self) -> bool {
        self.memory.is_some()
    }

    /// Mean signed label of the nearest neighbours, in [-1, 1]
    fn predict(&self, x: &[f64]) -> Result<f64> {
        let labels = self.neighbors(x)?;
        Ok(labels.iter().sum::<f64>() / labels.len() as f64)
    }

    /// Fraction of positive neighbours
    fn predict_proba(&self, x: &[f64]) -> Result<f64> {
        let labels = self.neighbors(x)?;
        let positives = labels.iter().filter(|&&y| y > 0.0).count();
        Ok(positives as f64 / labels.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Dataset {
        Dataset::new(
            vec![vec![0.0], vec![1.0], vec![2.0], vec![10.0], vec![11.0], vec![12.0]],
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_majority_vote() {
        let config = KnnConfig::default()
            .with_kernel(KernelSpec::Linear)
            .with_n_neighbors(3);
        let mut knn = KernelKNN::new(config).unwrap();
        knn.fit(&line()).unwrap();

        assert_eq!(knn.predict(&[1.5]).unwrap(), -1.0);
        assert_eq!(knn.predict_binary(&[10.5]).unwrap(), 1.0);
        assert_eq!(knn.predict_proba(&[11.0]).unwrap(), 1.0);
        assert_eq!(knn.score(&line()).unwrap(), 1.0);
    }

    #[test]
    fn test_mixed_neighbourhood() {
        let config = KnnConfig::default()
            .with_kernel(KernelSpec::Linear)
            .with_n_neighbors(4);
        let mut knn = KernelKNN::new(config).unwrap();
        knn.fit(&line()).unwrap();

        // nearest to 6: 2 (-1), 10 (+1), 1 (-1), 11 (+1)
        assert_eq!(knn.neighbors(&[6.0]).unwrap(), vec![-1.0, 1.0, -1.0, 1.0]);
        assert_eq!(knn.predict(&[6.0]).unwrap(), 0.0);
        assert_eq!(knn.predict_binary(&[6.0]).unwrap(), 1.0);
        assert_eq!(knn.predict_proba(&[6.0]).unwrap(), 0.5);
    }

    #[test]
    fn test_rbf_distance_ranks_like_euclidean() {
        let mut knn = KernelKNN::new(KnnConfig::default().with_n_neighbors(1)).unwrap();
        knn.fit(&line()).unwrap();
        assert_eq!(knn.neighbors(&[9.0]).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_more_neighbours_than_points() {
        let mut knn = KernelKNN::new(KnnConfig::default().with_n_neighbors(50)).unwrap();
        knn.fit(&line()).unwrap();
        assert_eq!(knn.neighbors(&[0.0]).unwrap().len(), 6);
    }

    #[test]
    fn test_errors() {
        assert!(KernelKNN::new(KnnConfig::default().with_n_neighbors(0)).is_err());
        let knn = KernelKNN::new(KnnConfig::default()).unwrap();
        assert!(matches!(
            knn.predict(&[0.0]),
            Err(KMethodError::ModelNotTrained)
        ));
    }
}
