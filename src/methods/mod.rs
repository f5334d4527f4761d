//! Kernel classifiers and their construction from configuration
//!
//! Every classifier has its own config struct; `MethodConfig` wraps them so a
//! method can be described in JSON and built with `build_method`:
//!
//! ```
//! use kmethods::methods::{build_method, MethodConfig};
//!
//! let config: MethodConfig = serde_json::from_str(
//!     r#"{"method": "klr", "lambda": 0.1, "kernel": {"family": "rbf", "gamma": 0.5}}"#,
//! ).unwrap();
//! let model = build_method(&config).unwrap();
//! assert_eq!(model.name(), "klr");
//! assert!(!model.is_fitted());
//! ```

pub mod knn;
pub mod logistic;
pub mod model;
pub mod svm;

pub use self::knn::{KernelKNN, KnnConfig};
pub use self::logistic::{KernelLogisticRegression, LogisticConfig};
pub use self::model::DualModel;
pub use self::svm::{KernelSVM, SvmConfig};

use crate::core::{KMethodError, KernelMethod, Result};
use crate::kernel::KernelSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classifier family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Klr,
    Svm,
    Knn,
}

impl FromStr for MethodKind {
    type Err = KMethodError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "klr" => Ok(MethodKind::Klr),
            "svm" => Ok(MethodKind::Svm),
            "knn" => Ok(MethodKind::Knn),
            other => Err(KMethodError::InvalidParameter(format!(
                "unknown method '{other}' (expected klr, svm or knn)"
            ))),
        }
    }
}

/// Configuration of any supported classifier, tagged by `"method"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum MethodConfig {
    Klr(LogisticConfig),
    Svm(SvmConfig),
    Knn(KnnConfig),
}

impl MethodConfig {
    pub fn name(&self) -> &'static str {
        match self {
            MethodConfig::Klr(_) => "klr",
            MethodConfig::Svm(_) => "svm",
            MethodConfig::Knn(_) => "knn",
        }
    }

    pub fn kernel(&self) -> &KernelSpec {
        match self {
            MethodConfig::Klr(c) => &c.kernel,
            MethodConfig::Svm(c) => &c.kernel,
            MethodConfig::Knn(c) => &c.kernel,
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            MethodConfig::Klr(_) => MethodKind::Klr,
            MethodConfig::Svm(_) => MethodKind::Svm,
            MethodConfig::Knn(_) => MethodKind::Knn,
        }
    }

    /// Default configuration of a method
    pub fn default_for(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Klr => MethodConfig::Klr(LogisticConfig::default()),
            MethodKind::Svm => MethodConfig::Svm(SvmConfig::default()),
            MethodKind::Knn => MethodConfig::Knn(KnnConfig::default()),
        }
    }
}

impl fmt::Display for MethodConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodConfig::Klr(c) => write!(
                f,
                "klr(kernel={}, lambda={}, max_iterations={}, tolerance={:e}, scale={})",
                c.kernel, c.lambda, c.max_iterations, c.tolerance, c.scale
            ),
            MethodConfig::Svm(c) => write!(
                f,
                "svm(kernel={}, C={}, epsilon={:e}, scale={})",
                c.kernel, c.c, c.epsilon, c.scale
            ),
            MethodConfig::Knn(c) => write!(
                f,
                "knn(kernel={}, n_neighbors={}, scale={})",
                c.kernel, c.n_neighbors, c.scale
            ),
        }
    }
}

/// Build an unfitted classifier from its configuration
pub fn build_method(config: &MethodConfig) -> Result<Box<dyn KernelMethod>> {
    Ok(match config {
        MethodConfig::Klr(c) => Box::new(KernelLogisticRegression::new(c.clone())?),
        MethodConfig::Svm(c) => Box::new(KernelSVM::new(c.clone())?),
        MethodConfig::Knn(c) => Box::new(KernelKNN::new(c.clone())?),
    })
}
