/// Errors from support vector classifier operations.
#[derive(Debug, thiserror::Error)]
pub enum SvmError {
    /// Returned when the regularization strength is not finite and positive.
    #[error("C must be finite and positive, got {c}")]
    InvalidC {
        /// The invalid C value provided.
        c: f64,
    },

    /// Returned when the RBF kernel coefficient is not finite and positive.
    #[error("gamma must be finite and positive, got {gamma}")]
    InvalidGamma {
        /// The invalid gamma value provided.
        gamma: f64,
    },

    /// Returned when the solver stopping tolerance is not finite and positive.
    #[error("tolerance must be finite and positive, got {tol}")]
    InvalidTolerance {
        /// The invalid tolerance provided.
        tol: f64,
    },

    /// Returned when the iteration cap is zero.
    #[error("max_iter must be at least 1, got {max_iter}")]
    InvalidMaxIter {
        /// The invalid iteration cap provided.
        max_iter: usize,
    },

    /// Returned when the number of calibration folds is less than 2.
    #[error("calibration_folds must be at least 2, got {folds}")]
    InvalidCalibrationFolds {
        /// The invalid fold count provided.
        folds: usize,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
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

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when fewer than two distinct classes are present.
    #[error("need at least two distinct classes to fit, got {n_classes}")]
    DegenerateTrainingSet {
        /// Number of distinct classes observed.
        n_classes: usize,
    },

    /// Returned when a class index below the highest label has no samples.
    #[error("class {class} has no samples (labels must be dense in 0..{n_classes})")]
    EmptyClass {
        /// The class index with zero samples.
        class: usize,
        /// Number of classes implied by the highest label.
        n_classes: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },
}
