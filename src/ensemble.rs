//! Weighted voting over fitted kernel classifiers

use crate::core::{FitStatus, FitSummary, KMethodError, KernelMethod, Result};
use crate::data::Dataset;
use log::info;

/// Tolerance on the sum of the voting weights
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Combines member votes into a weighted mean v in [0, 1]
///
/// Hard voting averages (label + 1) / 2, soft voting averages `predict_proba`.
/// The ensemble predicts +1 when v ≥ 1/2; its raw score is 2v - 1 so that the
/// usual sign convention of `KernelMethod` applies.
pub struct VotingClassifier {
    members: Vec<Box<dyn KernelMethod>>,
    weights: Vec<f64>,
    hard: bool,
}

impl VotingClassifier {
    /// `weights` defaults to uniform; otherwise it needs one entry per member summing to 1
    pub fn new(
        members: Vec<Box<dyn KernelMethod>>,
        weights: Option<Vec<f64>>,
        hard: bool,
    ) -> Result<Self> {
        if members.is_empty() {
            return Err(KMethodError::InvalidParameter(
                "a voting classifier needs at least one member".to_string(),
            ));
        }

        let weights = match weights {
            None => vec![1.0 / members.len() as f64; members.len()],
            Some(w) => {
                if w.len() != members.len() {
                    return Err(KMethodError::InvalidParameter(format!(
                        "got {} weights for {} members",
                        w.len(),
                        members.len()
                    )));
                }
                let sum: f64 = w.iter().sum();
                if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                    return Err(KMethodError::InvalidParameter(format!(
                        "weights must sum to 1, got {sum}"
                    )));
                }
                w
            }
        };

        Ok(Self {
            members,
            weights,
            hard,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Weighted mean of the member votes
    pub fn vote(&self, x: &[f64]) -> Result<f64> {
        let mut total = 0.0;
        for (member, weight) in self.members.iter().zip(&self.weights) {
            let vote = if self.hard {
                (member.predict_binary(x)? + 1.0) / 2.0
            } else {
                member.predict_proba(x)?
            };
            total += weight * vote;
        }
        Ok(total)
    }
}

impl KernelMethod for VotingClassifier {
    fn name(&self) -> &'static str {
        "voting"
    }

    /// Fit every member on the same dataset
    fn fit(&mut self, dataset: &Dataset) -> Result<FitSummary> {
        let mut iterations = 0;
        let mut status = FitStatus::Converged;
        for member in &mut self.members {
            let summary = member.fit(dataset)?;
            iterations += summary.iterations;
            if !summary.status.is_converged() {
                status = summary.status;
            }
        }
        info!(
            "Fitted {} voting members ({} voting)",
            self.members.len(),
            if self.hard { "hard" } else { "soft" }
        );
        Ok(FitSummary::new(dataset.len(), iterations, status))
    }

    fn is_fitted(&self) -> bool {
        self.members.iter().all(|m| m.is_fitted())
    }

    fn predict(&self, x: &[f64]) -> Result<f64> {
        Ok(2.0 * self.vote(x)? - 1.0)
    }

    fn predict_proba(&self, x: &[f64]) -> Result<f64> {
        self.vote(x)
    }
}
