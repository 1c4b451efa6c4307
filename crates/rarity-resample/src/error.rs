/// Errors from resampling operations.
#[derive(Debug, thiserror::Error)]
pub enum ResampleError {
    /// Returned when k_neighbors is zero.
    #[error("k_neighbors must be at least 1, got {k_neighbors}")]
    InvalidNeighborCount {
        /// The invalid k_neighbors value provided.
        k_neighbors: usize,
    },

    /// Returned when the input has zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when the input rows have zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when features and labels have different lengths.
    #[error("got {n_features} feature rows but {n_labels} labels")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_features: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a minority class is too small for neighbour synthesis.
    #[error("class {class} has only {count} samples, need at least {required} for {k_neighbors}-neighbour oversampling")]
    InsufficientSamples {
        /// The class label with insufficient samples.
        class: usize,
        /// The number of samples belonging to that class.
        count: usize,
        /// Minimum number of samples required.
        required: usize,
        /// The configured neighbour count.
        k_neighbors: usize,
    },
}
