//! Support vector classification: train, calibrate, predict.
//!
//! Provides a hand-rolled C-SVC with an RBF kernel, trained by SMO with
//! second-order working set selection. Multiclass problems are decomposed
//! one-vs-one; each pairwise model carries a Platt sigmoid fitted on
//! cross-validated decision values, and the pairwise probabilities are
//! coupled into a single class distribution.

mod config;
mod error;
mod kernel;
mod model;
mod platt;
mod predict;
mod smo;

pub use config::SvmConfig;
pub use error::SvmError;
pub use kernel::RbfKernel;
pub use model::SupportVectorClassifier;
pub use platt::Sigmoid;
pub use predict::ClassDistribution;
