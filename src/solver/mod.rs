//! Dual solvers
//!
//! `wkrr` and `irls` fit kernel logistic regression; `smo` fits the C-SVM dual.

pub mod irls;
pub mod smo;
pub mod wkrr;

pub use self::irls::*;
pub use self::smo::*;
pub use self::wkrr::*;
