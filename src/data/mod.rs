//! Datasets, label encodings, CSV loading and k-fold partitioning

pub mod csv;
pub mod dataset;
pub mod kfold;
pub mod labels;

pub use self::dataset::*;
pub use self::kfold::*;
