//! Class rebalancing for imbalanced classification datasets.
//!
//! Two stages, meant to run in order: [`SmoteConfig`] synthesizes minority
//! samples by interpolating towards same-class nearest neighbours until every
//! class matches the majority, then [`RandomUnderSamplerConfig`] trims every
//! class down to the smallest one. Both are seeded and deterministic.

mod dataset;
mod error;
mod neighbors;
mod result;
mod smote;
mod under;

pub use error::ResampleError;
pub use result::{ResampleResult, SamplingPlan};
pub use smote::{DEFAULT_K_NEIGHBORS, SmoteConfig};
pub use under::RandomUnderSamplerConfig;
