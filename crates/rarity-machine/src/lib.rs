//! The rarity classifier pipeline.
//!
//! A [`Machine`] is built from a labeled [`Table`](rarity_io::Table): it pulls
//! the `Level`, `Health`, `Energy` and `Sanity` features and the `Rarity`
//! label, balances the classes with SMOTE followed by random undersampling,
//! and fits an RBF support vector classifier with calibrated probabilities.
//! A fitted machine answers `(label, confidence)` predictions and can be
//! saved to and reopened from a single versioned file.

mod config;
mod error;
mod machine;
mod schema;
mod serialize;

pub use config::MachineConfig;
pub use error::{MachineError, PersistenceError, SchemaProblem};
pub use machine::{MODEL_NAME, Machine, Prediction, ResamplerState};
pub use schema::{FEATURE_COLUMNS, TARGET_COLUMN};
