//! Dual-coefficient model shared by the kernel classifiers
//!
//! A fitted model predicts with score(x) = Σ_i alpha_i · k(x_i, x) + b over
//! its stored points: every training point for logistic regression, only the
//! support vectors for the SVM. Nothing is available until `bind` is called
//! at the end of a successful fit.

use crate::core::{KMethodError, Result};
use crate::data::Dataset;
use crate::kernel::{Kernel, KernelFunction};
use crate::scaling::StandardScaler;
use std::borrow::Cow;

/// Kernel plus the coefficients bound by the last successful fit
#[derive(Debug, Clone)]
pub struct DualModel {
    kernel: KernelFunction,
    fitted: Option<FittedDual>,
}

#[derive(Debug, Clone)]
struct FittedDual {
    points: Vec<Vec<f64>>,
    alpha: Vec<f64>,
    bias: f64,
    dim: usize,
    scaler: Option<StandardScaler>,
}

impl DualModel {
    pub fn new(kernel: KernelFunction) -> Self {
        Self {
            kernel,
            fitted: None,
        }
    }

    pub fn kernel(&self) -> &KernelFunction {
        &self.kernel
    }

    /// Bind the result of a fit; `points` are already in the (possibly scaled) training space
    pub fn bind(
        &mut self,
        points: Vec<Vec<f64>>,
        alpha: Vec<f64>,
        bias: f64,
        dim: usize,
        scaler: Option<StandardScaler>,
    ) -> Result<()> {
        if points.len() != alpha.len() {
            return Err(KMethodError::DimensionMismatch {
                expected: points.len(),
                actual: alpha.len(),
            });
        }
        if let Some(row) = points.iter().find(|row| row.len() != dim) {
            return Err(KMethodError::DimensionMismatch {
                expected: dim,
                actual: row.len(),
            });
        }
        self.fitted = Some(FittedDual {
            points,
            alpha,
            bias,
            dim,
            scaler,
        });
        Ok(())
    }

    /// Forget the previous fit
    pub fn reset(&mut self) {
        self.fitted = None;
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn fitted(&self) -> Result<&FittedDual> {
        self.fitted.as_ref().ok_or(KMethodError::ModelNotTrained)
    }

    /// Dual coefficients, one per stored point
    pub fn alpha(&self) -> Result<&[f64]> {
        Ok(&self.fitted()?.alpha)
    }

    pub fn bias(&self) -> Result<f64> {
        Ok(self.fitted()?.bias)
    }

    /// Stored points in the training feature space
    pub fn points(&self) -> Result<&[Vec<f64>]> {
        Ok(&self.fitted()?.points)
    }

    /// Input dimension the model was fitted on
    pub fn dim(&self) -> Result<usize> {
        Ok(self.fitted()?.dim)
    }

    pub fn scaler(&self) -> Result<Option<&StandardScaler>> {
        Ok(self.fitted()?.scaler.as_ref())
    }

    /// Raw decision value for one input
    pub fn decision(&self, x: &[f64]) -> Result<f64> {
        let fitted = self.fitted()?;
        let x = prepare_input(fitted.dim, fitted.scaler.as_ref(), x)?;

        let sum: f64 = fitted
            .points
            .iter()
            .zip(&fitted.alpha)
            .map(|(point, a)| a * self.kernel.compute(point, &x))
            .sum();
        Ok(sum + fitted.bias)
    }
}

/// Check the input dimension and apply the training scaler, if any
pub(crate) fn prepare_input<'a>(
    dim: usize,
    scaler: Option<&StandardScaler>,
    x: &'a [f64],
) -> Result<Cow<'a, [f64]>> {
    if x.len() != dim {
        return Err(KMethodError::DimensionMismatch {
            expected: dim,
            actual: x.len(),
        });
    }
    match scaler {
        Some(scaler) => Ok(Cow::Owned(scaler.transform(x)?)),
        None => Ok(Cow::Borrowed(x)),
    }
}

/// Training features, standardized when `scale` is set, with the fitted scaler
pub(crate) fn training_features(
    dataset: &Dataset,
    scale: bool,
) -> Result<(Vec<Vec<f64>>, Option<StandardScaler>)> {
    if dataset.is_empty() {
        return Err(KMethodError::EmptyDataset);
    }
    if scale {
        let scaler = StandardScaler::fit(dataset.features())?;
        let features = scaler.transform_all(dataset.features())?;
        Ok((features, Some(scaler)))
    } else {
        Ok((dataset.features().to_vec(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;

    fn linear_model() -> DualModel {
        DualModel::new(KernelFunction::Linear(LinearKernel::new()))
    }

    #[test]
    fn test_untrained_access_fails() {
        let model = linear_model();
        assert!(!model.is_fitted());
        assert!(matches!(model.alpha(), Err(KMethodError::ModelNotTrained)));
        assert!(matches!(model.bias(), Err(KMethodError::ModelNotTrained)));
        assert!(matches!(
            model.decision(&[1.0]),
            Err(KMethodError::ModelNotTrained)
        ));
    }

    #[test]
    fn test_decision_is_weighted_kernel_sum() {
        let mut model = linear_model();
        model
            .bind(vec![vec![1.0, 0.0], vec![0.0, 2.0]], vec![0.5, -1.0], 0.25, 2, None)
            .unwrap();

        // 0.5 * 3 - 1.0 * 8 + 0.25
        assert_eq!(model.decision(&[3.0, 4.0]).unwrap(), -6.25);
        assert_eq!(model.alpha().unwrap(), &[0.5, -1.0]);
        assert_eq!(model.bias().unwrap(), 0.25);
    }

    #[test]
    fn test_dimension_is_checked() {
        let mut model = linear_model();
        model.bind(vec![vec![1.0]], vec![1.0], 0.0, 1, None).unwrap();
        assert!(matches!(
            model.decision(&[1.0, 2.0]),
            Err(KMethodError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert!(model.bind(vec![vec![1.0]], vec![1.0, 2.0], 0.0, 1, None).is_err());
    }

    #[test]
    fn test_scaler_applies_to_inputs() {
        let scaler = StandardScaler::fit(&[vec![0.0], vec![2.0]]).unwrap();
        let mut model = linear_model();
        model
            .bind(vec![vec![1.0]], vec![1.0], 0.0, 1, Some(scaler))
            .unwrap();
        // (3 - 1) / 1 = 2
        assert_eq!(model.decision(&[3.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_reset_forgets_fit() {
        let mut model = linear_model();
        model.bind(vec![], vec![], 1.0, 3, None).unwrap();
        assert_eq!(model.decision(&[0.0, 0.0, 0.0]).unwrap(), 1.0);
        model.reset();
        assert!(!model.is_fitted());
    }
}
