//! Serializable kernel description and the matching runtime kernel

use crate::core::{KMethodError, Result};
use crate::kernel::{Kernel, LinearKernel, PolynomialKernel, RBFKernel};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kernel family and its hyperparameters
///
/// In JSON the family is the `"family"` tag:
/// `{"family": "rbf", "gamma": 0.5}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum KernelSpec {
    Linear,
    Polynomial { gamma: f64, degree: u32, offset: f64 },
    Rbf { gamma: f64 },
}

impl Default for KernelSpec {
    fn default() -> Self {
        KernelSpec::Rbf { gamma: 1.0 }
    }
}

impl KernelSpec {
    /// Family name as used on the command line
    pub fn family(&self) -> &'static str {
        match self {
            KernelSpec::Linear => "linear",
            KernelSpec::Polynomial { .. } => "polynomial",
            KernelSpec::Rbf { .. } => "rbf",
        }
    }

    /// Check hyperparameters without building the kernel
    pub fn validate(&self) -> Result<()> {
        match *self {
            KernelSpec::Linear => Ok(()),
            KernelSpec::Polynomial {
                gamma,
                degree,
                offset,
            } => {
                if degree == 0 {
                    return Err(KMethodError::InvalidParameter(
                        "polynomial degree must be positive".to_string(),
                    ));
                }
                if !(gamma > 0.0 && gamma.is_finite()) {
                    return Err(KMethodError::InvalidParameter(format!(
                        "polynomial gamma must be positive, got {gamma}"
                    )));
                }
                if !offset.is_finite() {
                    return Err(KMethodError::InvalidParameter(format!(
                        "polynomial offset must be finite, got {offset}"
                    )));
                }
                Ok(())
            }
            KernelSpec::Rbf { gamma } => {
                if gamma > 0.0 && gamma.is_finite() {
                    Ok(())
                } else {
                    Err(KMethodError::InvalidParameter(format!(
                        "rbf gamma must be positive, got {gamma}"
                    )))
                }
            }
        }
    }

    /// Validate and instantiate the kernel
    pub fn build(&self) -> Result<KernelFunction> {
        self.validate()?;
        Ok(match *self {
            KernelSpec::Linear => KernelFunction::Linear(LinearKernel::new()),
            KernelSpec::Polynomial {
                gamma,
                degree,
                offset,
            } => KernelFunction::Polynomial(PolynomialKernel::new(degree, gamma, offset)),
            KernelSpec::Rbf { gamma } => KernelFunction::Rbf(RBFKernel::new(gamma)),
        })
    }
}

impl fmt::Display for KernelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelSpec::Linear => write!(f, "linear"),
            KernelSpec::Polynomial {
                gamma,
                degree,
                offset,
            } => write!(f, "polynomial(gamma={gamma}, degree={degree}, offset={offset})"),
            KernelSpec::Rbf { gamma } => write!(f, "rbf(gamma={gamma})"),
        }
    }
}

/// Runtime kernel selected from a `KernelSpec`
#[derive(Debug, Clone, Copy)]
pub enum KernelFunction {
    Linear(LinearKernel),
    Polynomial(PolynomialKernel),
    Rbf(RBFKernel),
}

impl Kernel for KernelFunction {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            KernelFunction::Linear(k) => k.compute(x, y),
            KernelFunction::Polynomial(k) => k.compute(x, y),
            KernelFunction::Rbf(k) => k.compute(x, y),
        }
    }

    fn gram(&self, samples: &[Vec<f64>]) -> DMatrix<f64> {
        match self {
            KernelFunction::Linear(k) => k.gram(samples),
            KernelFunction::Polynomial(k) => k.gram(samples),
            KernelFunction::Rbf(k) => k.gram(samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_dispatches_to_family() {
        let rbf = KernelSpec::Rbf { gamma: 0.5 }.build().unwrap();
        let x = [1.0, 0.0];
        let y = [0.0, 1.0];
        assert_eq!(rbf.compute(&x, &y), RBFKernel::new(0.5).compute(&x, &y));

        let linear = KernelSpec::Linear.build().unwrap();
        assert_eq!(linear.compute(&[2.0, 3.0], &[4.0, 5.0]), 23.0);

        let poly = KernelSpec::Polynomial {
            gamma: 1.0,
            degree: 2,
            offset: 1.0,
        }
        .build()
        .unwrap();
        assert_eq!(poly.compute(&[1.0], &[2.0]), 9.0);
    }

    #[test]
    fn test_invalid_hyperparameters_rejected() {
        assert!(KernelSpec::Rbf { gamma: 0.0 }.build().is_err());
        assert!(KernelSpec::Rbf { gamma: f64::NAN }.validate().is_err());
        assert!(KernelSpec::Polynomial {
            gamma: 1.0,
            degree: 0,
            offset: 0.0
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_json_roundtrip_uses_family_tag() {
        let spec: KernelSpec = serde_json::from_str(r#"{"family": "rbf", "gamma": 0.25}"#).unwrap();
        assert_eq!(spec, KernelSpec::Rbf { gamma: 0.25 });

        let json = serde_json::to_string(&KernelSpec::Linear).unwrap();
        assert_eq!(json, r#"{"family":"linear"}"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(KernelSpec::Rbf { gamma: 0.5 }.to_string(), "rbf(gamma=0.5)");
        assert_eq!(KernelSpec::Linear.family(), "linear");
    }
}
