//! Core traits for kernel classifiers

use crate::core::{sigmoid, sign_label, FitSummary, KMethodError, Prediction, Result};
use crate::data::Dataset;
use crate::metrics::ConfusionCounts;

/// Lifecycle shared by every kernel-based binary classifier
///
/// Implementors provide `fit` and the raw `predict` score; labelling,
/// batch prediction and evaluation are derived from those.
pub trait KernelMethod: Send + Sync {
    /// Short identifier of the method (used in logs and reports)
    fn name(&self) -> &'static str;

    /// Fit the model on a dataset, replacing any previous fit
    fn fit(&mut self, dataset: &Dataset) -> Result<FitSummary>;

    /// Whether `fit` has completed successfully
    fn is_fitted(&self) -> bool;

    /// Raw decision value for a single point
    ///
    /// # Errors
    /// `ModelNotTrained` before `fit`, `DimensionMismatch` on a wrongly sized input.
    fn predict(&self, x: &[f64]) -> Result<f64>;

    /// Class label in {-1, +1}; a score of exactly 0 is labelled +1
    fn predict_binary(&self, x: &[f64]) -> Result<f64> {
        Ok(sign_label(self.predict(x)?))
    }

    /// Probability-like score in [0, 1] for the positive class
    fn predict_proba(&self, x: &[f64]) -> Result<f64> {
        Ok(sigmoid(self.predict(x)?))
    }

    /// Predict every row of a feature matrix
    fn predict_array(&self, features: &[Vec<f64>]) -> Result<Vec<Prediction>> {
        features
            .iter()
            .map(|x| self.predict(x).map(Prediction::from_decision))
            .collect()
    }

    /// Confusion counts against the dataset labels (normalized to {-1, +1})
    ///
    /// # Errors
    /// `InvalidLabels` when the labels use both -1 and 0 as the negative class.
    fn confusion(&self, dataset: &Dataset) -> Result<ConfusionCounts> {
        let predictions = self.predict_array(dataset.features())?;
        let labels: Vec<f64> = predictions.iter().map(|p| p.label).collect();
        ConfusionCounts::from_labels(&labels, dataset.labels())
    }

    /// Fraction of predictions matching the true labels
    fn score(&self, dataset: &Dataset) -> Result<f64> {
        if dataset.is_empty() {
            return Err(KMethodError::EmptyDataset);
        }
        Ok(self.confusion(dataset)?.accuracy())
    }

    /// Recall and precision of the positive class
    ///
    /// # Errors
    /// `UndefinedMetric` when the dataset has no positive labels (recall) or
    /// the model predicts no positives (precision).
    fn recall_and_precision(&self, dataset: &Dataset) -> Result<(f64, f64)> {
        self.confusion(dataset)?.recall_and_precision()
    }
}
