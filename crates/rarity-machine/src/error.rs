use std::fmt;
use std::path::PathBuf;

use rarity_resample::ResampleError;
use rarity_svm::SvmError;

/// How a table failed to match the expected columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaProblem {
    /// The column is required but absent.
    Missing,
    /// The column must hold numbers.
    NotNumeric,
    /// The column must hold text labels.
    NotText,
    /// The column is not one of the model's features.
    Unexpected,
    /// The column is present but not at its fit-time position.
    OutOfOrder,
}

impl fmt::Display for SchemaProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaProblem::Missing => "required column is missing",
            SchemaProblem::NotNumeric => "column must be numeric",
            SchemaProblem::NotText => "column must hold text labels",
            SchemaProblem::Unexpected => "column is not a model feature",
            SchemaProblem::OutOfOrder => "column is out of fit-time order",
        })
    }
}

/// Errors from building, querying and persisting a [`Machine`](crate::Machine).
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    /// Returned when the input table has zero rows.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// Returned when the input table does not have the expected columns.
    #[error("schema mismatch on column \"{column}\": {problem}")]
    SchemaMismatch {
        /// The offending column name.
        column: String,
        /// What is wrong with it.
        problem: SchemaProblem,
    },

    /// Returned when single-row prediction receives a different row count.
    #[error("expected exactly one row to predict, got {rows}")]
    ExpectedSingleRow {
        /// Number of rows supplied.
        rows: usize,
    },

    /// Returned when a feature value to predict on is NaN or infinite.
    #[error("row {row} has a non-finite value in column \"{column}\"")]
    NonFiniteFeature {
        /// Zero-based row index.
        row: usize,
        /// Name of the offending feature column.
        column: String,
    },

    /// Returned when the resampling stage fails.
    #[error("resampling failed")]
    Resample(#[from] ResampleError),

    /// Returned when the classifier fails to fit or predict.
    #[error("classifier failed")]
    Svm(#[from] SvmError),

    /// Returned when saving or opening a model artifact fails.
    #[error("model persistence failed")]
    Persistence(#[from] PersistenceError),
}

/// Errors from saving and opening model artifacts.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Returned when the model file cannot be read.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the model file cannot be written.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when bincode encoding fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// Underlying bincode error.
        source: bincode::Error,
    },

    /// Returned when bincode decoding fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path that was read.
        path: PathBuf,
        /// Underlying bincode error.
        source: bincode::Error,
    },

    /// Returned when the artifact was written by an incompatible format version.
    #[error("incompatible model format version {found} in {path}, expected {expected}")]
    IncompatibleVersion {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        found: u32,
        /// Path that was read.
        path: PathBuf,
    },

    /// Returned when the artifact holds a different kind of model.
    #[error("model in {path} is \"{found}\", expected \"{expected}\"")]
    IncompatibleModelKind {
        /// Kind this build reads.
        expected: String,
        /// Kind found in the file.
        found: String,
        /// Path that was read.
        path: PathBuf,
    },
}
