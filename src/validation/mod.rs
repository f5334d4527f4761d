//! Model selection: cross-validation, random search and post-fit checks

pub mod crossval;
pub mod sanity;
pub mod search;

pub use self::crossval::*;
pub use self::sanity::*;
pub use self::search::*;
