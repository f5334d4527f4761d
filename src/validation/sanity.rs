//! Post-fit check of raw decision values

use crate::core::{KMethodError, KernelMethod, Result};
use crate::data::Dataset;
use log::info;
use serde::Serialize;

/// Range of the decision values on the first rows of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanityReport {
    pub min: f64,
    pub max: f64,
    /// Decision values in row order
    pub first: Vec<f64>,
}

/// Evaluate the model on up to `n` rows and log the range of its scores
///
/// A fitted model that returns the same score everywhere (max == min) has
/// usually collapsed, e.g. through too strong a regularization.
pub fn sanity_check<M: KernelMethod + ?Sized>(
    model: &M,
    dataset: &Dataset,
    n: usize,
) -> Result<SanityReport> {
    let rows = n.min(dataset.len());
    if rows == 0 {
        return Err(KMethodError::EmptyDataset);
    }

    let first = dataset.features()[..rows]
        .iter()
        .map(|x| model.predict(x))
        .collect::<Result<Vec<f64>>>()?;
    let min = first.iter().copied().fold(f64::INFINITY, f64::min);
    let max = first.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    info!(
        "{} decision values on {rows} rows: min {min:.6}, max {max:.6}",
        model.name()
    );
    Ok(SanityReport { min, max, first })
}
