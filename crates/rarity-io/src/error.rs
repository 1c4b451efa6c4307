//! I/O error types for rarity-io.

use std::path::PathBuf;

/// Errors from tables, record stores and chart rendering.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when two columns of a table share a name.
    #[error("duplicate column \"{name}\"")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },

    /// Returned when a column's length differs from the table's row count.
    #[error("column \"{column}\" has {got} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// Name of the offending column.
        column: String,
        /// Row count of the first column.
        expected: usize,
        /// Row count of the offending column.
        got: usize,
    },

    /// Returned when a requested column does not exist.
    #[error("column \"{name}\" not found (available: {available:?})")]
    MissingColumn {
        /// The requested column name.
        name: String,
        /// Column names that do exist.
        available: Vec<String>,
    },

    /// Returned when a collection name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid collection name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidCollectionName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the store directory cannot be created.
    #[error("cannot create store directory {path}")]
    StoreDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a store file exists but cannot be opened.
    #[error("cannot read store file {path}")]
    ReadStore {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when records cannot be encoded as CSV.
    #[error("CSV encode error for {path}")]
    CsvWrite {
        /// Path being written.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a file cannot be written or renamed into place.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
