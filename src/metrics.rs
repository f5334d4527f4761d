//! Classification metrics over {-1, +1} labels
//!
//! Ratios whose denominator is zero are reported as `None` instead of NaN.

use crate::core::{KMethodError, Result};
use crate::data::labels;
use serde::Serialize;

/// Confusion matrix counts for binary classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    pub fn new(tp: usize, tn: usize, fp: usize, fn_: usize) -> Self {
        Self {
            true_positives: tp,
            true_negatives: tn,
            false_positives: fp,
            false_negatives: fn_,
        }
    }

    /// Count predictions against ground truth
    ///
    /// Ground-truth labels may use either the {0, 1} or the {-1, +1}
    /// encoding, but not both at once; both sides are normalized before
    /// counting.
    pub fn from_labels(predictions: &[f64], truth: &[f64]) -> Result<Self> {
        if predictions.len() != truth.len() {
            return Err(KMethodError::DimensionMismatch {
                expected: truth.len(),
                actual: predictions.len(),
            });
        }

        let truth = labels::to_signed_all(truth)?;
        let mut counts = Self::default();
        for (&pred, &actual) in predictions.iter().zip(truth.iter()) {
            let pred = labels::to_signed(pred)?;
            match (pred > 0.0, actual > 0.0) {
                (true, true) => counts.true_positives += 1,
                (false, false) => counts.true_negatives += 1,
                (true, false) => counts.false_positives += 1,
                (false, true) => counts.false_negatives += 1,
            }
        }
        Ok(counts)
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.true_positives + self.true_negatives) as f64 / total as f64
        }
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> Option<f64> {
        ratio(self.true_negatives, self.true_negatives + self.false_positives)
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> Option<f64> {
        let p = self.precision()?;
        let r = self.recall()?;
        if p + r == 0.0 {
            None
        } else {
            Some(2.0 * (p * r) / (p + r))
        }
    }

    /// Recall and precision, failing if either is undefined
    pub fn recall_and_precision(&self) -> Result<(f64, f64)> {
        let recall = self.recall().ok_or_else(|| {
            KMethodError::UndefinedMetric("recall (no positive ground-truth labels)".to_string())
        })?;
        let precision = self.precision().ok_or_else(|| {
            KMethodError::UndefinedMetric("precision (no positive predictions)".to_string())
        })?;
        Ok((recall, precision))
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}
