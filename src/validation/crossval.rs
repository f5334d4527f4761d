//! K-fold cross-validation of a method configuration

use crate::core::Result;
use crate::data::{Dataset, KFold};
use crate::methods::{build_method, MethodConfig};
use crate::metrics::ConfusionCounts;
use log::{debug, info, warn};
use serde::Serialize;

/// Validation metrics of a single fold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldScores {
    pub fold: usize,
    pub accuracy: f64,
    /// `None` when the fold has no positive labels
    pub recall: Option<f64>,
    /// `None` when the model predicted no positives on the fold
    pub precision: Option<f64>,
    pub f1: Option<f64>,
    pub counts: ConfusionCounts,
}

impl FoldScores {
    fn from_counts(fold: usize, counts: ConfusionCounts) -> Self {
        Self {
            fold,
            accuracy: counts.accuracy(),
            recall: counts.recall(),
            precision: counts.precision(),
            f1: counts.f1_score(),
            counts,
        }
    }
}

/// Mean and sample standard deviation over the folds where a metric is defined
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub defined_folds: usize,
}

impl MetricSummary {
    pub fn from_values<I: IntoIterator<Item = Option<f64>>>(values: I) -> Self {
        let defined: Vec<f64> = values.into_iter().flatten().collect();
        let count = defined.len();
        if count == 0 {
            return Self {
                mean: None,
                std: None,
                defined_folds: 0,
            };
        }

        let mean = defined.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let variance =
                defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Self {
            mean: Some(mean),
            std: Some(std),
            defined_folds: count,
        }
    }
}

/// Per-fold scores and their aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationReport {
    pub config: MethodConfig,
    pub folds: Vec<FoldScores>,
    pub accuracy: MetricSummary,
    pub recall: MetricSummary,
    pub precision: MetricSummary,
    pub f1: MetricSummary,
}

impl CrossValidationReport {
    fn new(config: MethodConfig, folds: Vec<FoldScores>) -> Self {
        Self {
            accuracy: MetricSummary::from_values(folds.iter().map(|f| Some(f.accuracy))),
            recall: MetricSummary::from_values(folds.iter().map(|f| f.recall)),
            precision: MetricSummary::from_values(folds.iter().map(|f| f.precision)),
            f1: MetricSummary::from_values(folds.iter().map(|f| f.f1)),
            config,
            folds,
        }
    }

    /// Mean validation accuracy (every fold has one)
    pub fn mean_accuracy(&self) -> f64 {
        self.accuracy.mean.unwrap_or(0.0)
    }

    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }
}

/// Fit a fresh model on each training split and score it on the held-out fold
pub fn cross_validate(
    config: &MethodConfig,
    dataset: &Dataset,
    kfold: &KFold,
) -> Result<CrossValidationReport> {
    let mut folds = Vec::new();

    for (fold, (train, validation)) in kfold.folds(dataset)?.into_iter().enumerate() {
        if is_single_class(train.labels()) {
            warn!(
                "fold {fold}: training split holds a single class; \
                 shuffle the folds if the rows are sorted by label"
            );
        }
        let mut model = build_method(config)?;
        model.fit(&train)?;
        let counts = model.confusion(&validation)?;
        let scores = FoldScores::from_counts(fold, counts);
        debug!(
            "fold {fold}: accuracy {:.4} on {} validation samples",
            scores.accuracy,
            validation.len()
        );
        folds.push(scores);
    }

    let report = CrossValidationReport::new(config.clone(), folds);
    info!(
        "{config}: {}-fold accuracy {:.4} ± {:.4}",
        report.n_folds(),
        report.mean_accuracy(),
        report.accuracy.std.unwrap_or(0.0)
    );
    Ok(report)
}

/// Whether every label falls on the same side of {-1/0, +1}
fn is_single_class(labels: &[f64]) -> bool {
    match labels.first() {
        Some(&first) => labels.iter().all(|&y| (y == 1.0) == (first == 1.0)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::KMethodError;
    use crate::kernel::KernelSpec;
    use crate::methods::{KnnConfig, LogisticConfig};
    use approx::assert_relative_eq;

    fn clusters() -> Dataset {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            let offset = i as f64 * 0.1;
            features.push(vec![-3.0 + offset, -3.0 - offset]);
            labels.push(-1.0);
            features.push(vec![3.0 - offset, 3.0 + offset]);
            labels.push(1.0);
        }
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn test_metric_summary() {
        let summary = MetricSummary::from_values([Some(1.0), None, Some(3.0)]);
        assert_eq!(summary.defined_folds, 2);
        assert_eq!(summary.mean, Some(2.0));
        assert_relative_eq!(summary.std.unwrap(), 2f64.sqrt(), epsilon = 1e-12);

        let single = MetricSummary::from_values([Some(0.5)]);
        assert_eq!(single.std, Some(0.0));

        let none = MetricSummary::from_values([None, None]);
        assert_eq!(none.mean, None);
    }

    #[test]
    fn test_cross_validate_separable_data() {
        let config = MethodConfig::Klr(
            LogisticConfig::default()
                .with_kernel(KernelSpec::Rbf { gamma: 0.5 })
                .with_lambda(0.1),
        );
        let kfold = KFold::new(4).unwrap().with_shuffle(7);
        let report = cross_validate(&config, &clusters(), &kfold).unwrap();

        assert_eq!(report.n_folds(), 4);
        assert_eq!(report.mean_accuracy(), 1.0);
        assert_eq!(report.accuracy.std, Some(0.0));
        let validated: usize = report.folds.iter().map(|f| f.counts.total()).sum();
        assert_eq!(validated, 20);
    }

    #[test]
    fn test_undefined_metrics_are_skipped() {
        // unshuffled 2-fold split: fold 0 validates on negatives only,
        // fold 1 trains on negatives only and never predicts a positive
        let data = Dataset::new(
            vec![vec![-2.0], vec![-1.0], vec![1.0], vec![2.0]],
            vec![-1.0, -1.0, -1.0, 1.0],
        )
        .unwrap();
        let config = MethodConfig::Knn(
            KnnConfig::default()
                .with_kernel(KernelSpec::Linear)
                .with_n_neighbors(1),
        );
        let report = cross_validate(&config, &data, &KFold::new(2).unwrap()).unwrap();

        assert_eq!(report.folds[0].recall, None);
        assert_eq!(report.folds[0].precision, None);
        assert_eq!(report.folds[1].recall, Some(0.0));
        assert_eq!(report.folds[1].precision, None);

        assert_eq!(report.accuracy.defined_folds, 2);
        assert_eq!(report.mean_accuracy(), 0.75);
        assert_eq!(report.recall.defined_folds, 1);
        assert_eq!(report.precision.mean, None);
    }

    #[test]
    fn test_too_many_folds() {
        let config = MethodConfig::Knn(KnnConfig::default());
        let kfold = KFold::new(30).unwrap();
        assert!(cross_validate(&config, &clusters(), &kfold).is_err());
    }

    #[test]
    fn test_single_class_detection() {
        assert!(is_single_class(&[1.0, 1.0]));
        assert!(is_single_class(&[-1.0, 0.0]));
        assert!(!is_single_class(&[0.0, 1.0]));
        assert!(!is_single_class(&[]));
    }

    #[test]
    fn test_sorted_rows_need_shuffled_folds() {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for (center, label) in [(-3.0, 0.0), (3.0, 1.0)] {
            for i in 0..6 {
                features.push(vec![center + i as f64 * 0.1]);
                labels.push(label);
            }
        }
        let sorted = Dataset::new(features, labels).unwrap();
        let config = MethodConfig::Klr(LogisticConfig::default().with_kernel(KernelSpec::Linear));

        // contiguous folds leave each training split with one class
        let result = cross_validate(&config, &sorted, &KFold::new(2).unwrap());
        assert!(matches!(result, Err(KMethodError::InvalidLabels(_))));

        let mut shuffled = None;
        for seed in 0..20 {
            let kfold = KFold::new(2).unwrap().with_shuffle(seed);
            let mixed = kfold
                .folds(&sorted)
                .unwrap()
                .iter()
                .all(|(train, _)| !is_single_class(train.labels()));
            if mixed {
                shuffled = Some(kfold);
                break;
            }
        }
        let report = cross_validate(&config, &sorted, &shuffled.unwrap()).unwrap();
        assert_eq!(report.n_folds(), 2);
    }
}
