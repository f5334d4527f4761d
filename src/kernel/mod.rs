//! Kernel functions and Gram matrices

pub mod family;
pub mod gram;
pub mod linear;
pub mod polynomial;
pub mod rbf;
pub mod traits;

pub use self::family::*;
pub use self::linear::LinearKernel;
pub use self::polynomial::PolynomialKernel;
pub use self::rbf::RBFKernel;
pub use self::traits::*;
