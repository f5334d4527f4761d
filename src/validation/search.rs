//! Randomized hyperparameter search
//!
//! For a fixed method and kernel family, sample kernel and classifier
//! hyperparameters, cross-validate every sample and keep all reports.

use crate::core::{KMethodError, Result};
use crate::data::{Dataset, KFold};
use crate::kernel::KernelSpec;
use crate::methods::{KnnConfig, LogisticConfig, MethodConfig, MethodKind, SvmConfig};
use crate::validation::crossval::{cross_validate, CrossValidationReport};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Distribution a hyperparameter is drawn from
///
/// JSON form: `{"dist": "log_uniform", "low": 0.001, "high": 10.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dist", rename_all = "snake_case")]
pub enum ParamDistribution {
    Fixed { value: f64 },
    /// Uniform on [low, high)
    Uniform { low: f64, high: f64 },
    /// exp(Uniform(ln low, ln high))
    LogUniform { low: f64, high: f64 },
    /// Integer in [low, high], both inclusive
    IntRange { low: i64, high: i64 },
    Choice { values: Vec<f64> },
}

impl ParamDistribution {
    pub fn validate(&self) -> Result<()> {
        let ok = match self {
            ParamDistribution::Fixed { value } => value.is_finite(),
            ParamDistribution::Uniform { low, high } => {
                low.is_finite() && high.is_finite() && low < high
            }
            ParamDistribution::LogUniform { low, high } => {
                *low > 0.0 && high.is_finite() && low < high
            }
            ParamDistribution::IntRange { low, high } => low <= high,
            ParamDistribution::Choice { values } => {
                !values.is_empty() && values.iter().all(|v| v.is_finite())
            }
        };
        if ok {
            Ok(())
        } else {
            Err(KMethodError::InvalidParameter(format!(
                "invalid distribution {self:?}"
            )))
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            ParamDistribution::Fixed { value } => *value,
            ParamDistribution::Uniform { low, high } => rng.gen_range(*low..*high),
            ParamDistribution::LogUniform { low, high } => {
                rng.gen_range(low.ln()..high.ln()).exp()
            }
            ParamDistribution::IntRange { low, high } => rng.gen_range(*low..=*high) as f64,
            ParamDistribution::Choice { values } => values[rng.gen_range(0..values.len())],
        }
    }
}

/// Kernel family whose hyperparameters are searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelFamily {
    Linear,
    Polynomial,
    Rbf,
}

/// Distributions of every searchable hyperparameter
///
/// Only the ones relevant to `method` and `kernel` are sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSpace {
    pub method: MethodKind,
    pub kernel: KernelFamily,
    pub gamma: ParamDistribution,
    pub degree: ParamDistribution,
    pub offset: ParamDistribution,
    pub lambda: ParamDistribution,
    pub max_iterations: ParamDistribution,
    pub c: ParamDistribution,
    pub n_neighbors: ParamDistribution,
    pub scale: bool,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            method: MethodKind::Klr,
            kernel: KernelFamily::Rbf,
            gamma: ParamDistribution::LogUniform {
                low: 1e-3,
                high: 10.0,
            },
            degree: ParamDistribution::IntRange { low: 2, high: 4 },
            offset: ParamDistribution::Uniform {
                low: 0.0,
                high: 1.0,
            },
            lambda: ParamDistribution::LogUniform {
                low: 1e-3,
                high: 10.0,
            },
            max_iterations: ParamDistribution::Fixed { value: 100.0 },
            c: ParamDistribution::LogUniform {
                low: 1e-2,
                high: 100.0,
            },
            n_neighbors: ParamDistribution::IntRange { low: 1, high: 15 },
            scale: false,
        }
    }
}

impl SearchSpace {
    pub fn new(method: MethodKind, kernel: KernelFamily) -> Self {
        Self {
            method,
            kernel,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        for dist in [
            &self.gamma,
            &self.degree,
            &self.offset,
            &self.lambda,
            &self.max_iterations,
            &self.c,
            &self.n_neighbors,
        ] {
            dist.validate()?;
        }
        Ok(())
    }

    /// Draw one configuration
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MethodConfig {
        let kernel = match self.kernel {
            KernelFamily::Linear => KernelSpec::Linear,
            KernelFamily::Polynomial => KernelSpec::Polynomial {
                gamma: self.gamma.sample(rng),
                degree: self.degree.sample(rng).round().max(1.0) as u32,
                offset: self.offset.sample(rng),
            },
            KernelFamily::Rbf => KernelSpec::Rbf {
                gamma: self.gamma.sample(rng),
            },
        };

        match self.method {
            MethodKind::Klr => MethodConfig::Klr(
                LogisticConfig::default()
                    .with_kernel(kernel)
                    .with_lambda(self.lambda.sample(rng))
                    .with_max_iterations(self.max_iterations.sample(rng).round().max(1.0) as usize)
                    .with_scale(self.scale),
            ),
            MethodKind::Svm => MethodConfig::Svm(
                SvmConfig::default()
                    .with_kernel(kernel)
                    .with_c(self.c.sample(rng))
                    .with_scale(self.scale),
            ),
            MethodKind::Knn => MethodConfig::Knn(
                KnnConfig::default()
                    .with_kernel(kernel)
                    .with_n_neighbors(self.n_neighbors.sample(rng).round().max(1.0) as usize)
                    .with_scale(self.scale),
            ),
        }
    }
}

/// One evaluated configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub config: MethodConfig,
    pub report: CrossValidationReport,
}

/// Random search over a `SearchSpace`, reproducible for a fixed seed
#[derive(Debug)]
pub struct RandomSearch {
    space: SearchSpace,
    n_samples: usize,
    n_folds: usize,
    rng: StdRng,
    results: Vec<SearchResult>,
}

impl RandomSearch {
    pub fn new(space: SearchSpace, n_samples: usize, seed: u64) -> Result<Self> {
        space.validate()?;
        if n_samples == 0 {
            return Err(KMethodError::InvalidParameter(
                "n_samples must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            space,
            n_samples,
            n_folds: 5,
            rng: StdRng::seed_from_u64(seed),
            results: Vec::new(),
        })
    }

    /// Number of cross-validation folds (default 5)
    pub fn with_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    /// Sample and cross-validate `n_samples` configurations
    ///
    /// A sampled configuration that fails to fit (e.g. a singular system) is
    /// logged and skipped; the search fails only if every sample fails.
    pub fn run(&mut self, dataset: &Dataset) -> Result<&[SearchResult]> {
        let kfold = KFold::new(self.n_folds)?.with_shuffle(self.rng.gen());
        self.results.clear();
        let mut last_error = None;

        for i in 0..self.n_samples {
            let config = self.space.sample(&mut self.rng);
            match cross_validate(&config, dataset, &kfold) {
                Ok(report) => {
                    info!(
                        "[{}/{}] {config}: accuracy {:.4}",
                        i + 1,
                        self.n_samples,
                        report.mean_accuracy()
                    );
                    self.results.push(SearchResult { config, report });
                }
                Err(e) => {
                    warn!("[{}/{}] {config} failed: {e}", i + 1, self.n_samples);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if self.results.is_empty() => Err(e),
            _ => Ok(&self.results),
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// Result with the highest mean accuracy; the earliest wins ties
    pub fn best(&self) -> Option<&SearchResult> {
        self.results.iter().fold(None, |best, r| match best {
            Some(b) if b.report.mean_accuracy() >= r.report.mean_accuracy() => Some(b),
            _ => Some(r),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Dataset {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..12 {
            let t = i as f64 * 0.15;
            features.push(vec![-2.0 + t, -2.0 - t]);
            labels.push(0.0);
            features.push(vec![2.0 - t, 2.0 + t]);
            labels.push(1.0);
        }
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn test_distributions_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(0);
        let log = ParamDistribution::LogUniform {
            low: 1e-3,
            high: 10.0,
        };
        let ints = ParamDistribution::IntRange { low: 1, high: 3 };
        let choice = ParamDistribution::Choice {
            values: vec![0.5, 2.0],
        };
        for _ in 0..200 {
            let v = log.sample(&mut rng);
            assert!((1e-3..=10.0).contains(&v));
            let k = ints.sample(&mut rng);
            assert!(k == 1.0 || k == 2.0 || k == 3.0);
            let c = choice.sample(&mut rng);
            assert!(c == 0.5 || c == 2.0);
        }
        assert_eq!(ParamDistribution::Fixed { value: 4.0 }.sample(&mut rng), 4.0);
    }

    #[test]
    fn test_invalid_distributions() {
        assert!(ParamDistribution::LogUniform {
            low: 0.0,
            high: 1.0
        }
        .validate()
        .is_err());
        assert!(ParamDistribution::Uniform {
            low: 2.0,
            high: 1.0
        }
        .validate()
        .is_err());
        assert!(ParamDistribution::Choice { values: vec![] }.validate().is_err());

        let mut space = SearchSpace::default();
        space.c = ParamDistribution::IntRange { low: 5, high: 1 };
        assert!(RandomSearch::new(space, 3, 0).is_err());
        assert!(RandomSearch::new(SearchSpace::default(), 0, 0).is_err());
    }

    #[test]
    fn test_sampled_config_matches_method_and_family() {
        let mut rng = StdRng::seed_from_u64(1);
        let space = SearchSpace::new(MethodKind::Svm, KernelFamily::Polynomial);
        match space.sample(&mut rng) {
            MethodConfig::Svm(config) => {
                assert!(matches!(config.kernel, KernelSpec::Polynomial { degree, .. } if (2..=4).contains(&degree)));
                assert!(config.c > 0.0);
            }
            other => panic!("unexpected config {other:?}"),
        }

        let space = SearchSpace::new(MethodKind::Knn, KernelFamily::Linear);
        assert!(matches!(
            space.sample(&mut rng),
            MethodConfig::Knn(KnnConfig {
                kernel: KernelSpec::Linear,
                ..
            })
        ));
    }

    #[test]
    fn test_search_is_reproducible() {
        let space = SearchSpace::new(MethodKind::Knn, KernelFamily::Rbf);

        let mut first = RandomSearch::new(space.clone(), 4, 42).unwrap().with_folds(3);
        first.run(&blobs()).unwrap();
        let mut second = RandomSearch::new(space, 4, 42).unwrap().with_folds(3);
        second.run(&blobs()).unwrap();

        assert_eq!(first.results().len(), 4);
        assert_eq!(first.results(), second.results());

        let best = first.best().unwrap();
        assert!(first
            .results()
            .iter()
            .all(|r| r.report.mean_accuracy() <= best.report.mean_accuracy()));
    }

    #[test]
    fn test_space_from_json() {
        let space: SearchSpace = serde_json::from_str(
            r#"{"method": "svm", "kernel": "linear", "c": {"dist": "choice", "values": [0.1, 1.0]}}"#,
        )
        .unwrap();
        assert_eq!(space.method, MethodKind::Svm);
        assert_eq!(space.kernel, KernelFamily::Linear);
        assert_eq!(
            space.c,
            ParamDistribution::Choice {
                values: vec![0.1, 1.0]
            }
        );
        assert_eq!(space.lambda, SearchSpace::default().lambda);
    }
}
