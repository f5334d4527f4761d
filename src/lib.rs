//! Kernel methods for binary classification
//!
//! Kernel logistic regression fitted by iteratively reweighted least squares
//! (IRLS), plus a kernel SVM (SMO) and kernel k-nearest neighbours sharing
//! the same `KernelMethod` lifecycle.
//!
//! ```
//! use kmethods::{Dataset, KernelLogisticRegression, KernelMethod, KernelSpec, LogisticConfig};
//!
//! # fn main() -> kmethods::Result<()> {
//! let data = Dataset::new(
//!     vec![vec![-2.0, -1.0], vec![-1.0, -2.0], vec![1.0, 2.0], vec![2.0, 1.0]],
//!     vec![0.0, 0.0, 1.0, 1.0],
//! )?;
//! let config = LogisticConfig::default()
//!     .with_kernel(KernelSpec::Rbf { gamma: 0.5 })
//!     .with_lambda(0.1);
//! let mut model = KernelLogisticRegression::new(config)?;
//! model.fit(&data)?;
//! assert_eq!(model.predict_binary(&[1.5, 1.5])?, 1.0);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod core;
pub mod data;
pub mod ensemble;
pub mod kernel;
pub mod methods;
pub mod metrics;
pub mod scaling;
pub mod solver;
pub mod validation;

// Re-export main types for convenience
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::*;
pub use crate::data::{Dataset, KFold};
pub use crate::ensemble::VotingClassifier;
pub use crate::kernel::{Kernel, KernelFunction, KernelSpec};
pub use crate::methods::{
    build_method, KernelKNN, KernelLogisticRegression, KernelSVM, KnnConfig, LogisticConfig,
    MethodConfig, MethodKind, SvmConfig,
};
pub use crate::metrics::ConfusionCounts;
pub use crate::scaling::StandardScaler;
pub use crate::validation::{
    cross_validate, sanity_check, CrossValidationReport, ParamDistribution, RandomSearch,
    SanityReport, SearchSpace,
};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
