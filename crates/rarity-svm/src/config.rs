//! Configuration builder for support vector classification.

use crate::error::SvmError;
use crate::model::SupportVectorClassifier;

/// Configuration for fitting a [`SupportVectorClassifier`].
///
/// Construct via [`SvmConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default      |
/// |---------------------|--------------|
/// | `c`                 | 7.0          |
/// | `gamma`             | 0.1          |
/// | `tol`               | 1e-3         |
/// | `max_iter`          | 10_000_000   |
/// | `calibration_folds` | 5            |
/// | `seed`              | 42           |
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SvmConfig {
    pub(crate) c: f64,
    pub(crate) gamma: f64,
    pub(crate) tol: f64,
    pub(crate) max_iter: usize,
    pub(crate) calibration_folds: usize,
    pub(crate) seed: u64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SvmConfig {
    /// Create a config with the default hyperparameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            c: 7.0,
            gamma: 0.1,
            tol: 1e-3,
            max_iter: 10_000_000,
            calibration_folds: 5,
            seed: 42,
        }
    }

    // --- Setters ---

    /// Set the regularization strength.
    #[must_use]
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set the RBF kernel coefficient.
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the KKT violation tolerance used to stop SMO.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the SMO iteration cap per binary problem.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the number of folds used to produce calibration decision values.
    #[must_use]
    pub fn with_calibration_folds(mut self, folds: usize) -> Self {
        self.calibration_folds = folds;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the regularization strength.
    #[must_use]
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Return the RBF kernel coefficient.
    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Return the SMO stopping tolerance.
    #[must_use]
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Return the SMO iteration cap.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the number of calibration folds.
    #[must_use]
    pub fn calibration_folds(&self) -> usize {
        self.calibration_folds
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Check every hyperparameter.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SvmError::InvalidC`] | `c` not finite and positive |
    /// | [`SvmError::InvalidGamma`] | `gamma` not finite and positive |
    /// | [`SvmError::InvalidTolerance`] | `tol` not finite and positive |
    /// | [`SvmError::InvalidMaxIter`] | `max_iter` is zero |
    /// | [`SvmError::InvalidCalibrationFolds`] | `calibration_folds` < 2 |
    pub fn validate(&self) -> Result<(), SvmError> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(SvmError::InvalidC { c: self.c });
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(SvmError::InvalidGamma { gamma: self.gamma });
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(SvmError::InvalidTolerance { tol: self.tol });
        }
        if self.max_iter == 0 {
            return Err(SvmError::InvalidMaxIter {
                max_iter: self.max_iter,
            });
        }
        if self.calibration_folds < 2 {
            return Err(SvmError::InvalidCalibrationFolds {
                folds: self.calibration_folds,
            });
        }
        Ok(())
    }

    /// Fit a one-vs-one RBF classifier with calibrated probabilities.
    ///
    /// `features[sample_idx][feature_idx]`: row-major layout.
    /// `labels[sample_idx]`: class indices, dense in `0..n_classes`.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                      |
    /// |---------------------------------------|-------------------------------------------|
    /// | config variants                       | see [`SvmConfig::validate`]               |
    /// | [`SvmError::EmptyDataset`]            | `features` is empty                       |
    /// | [`SvmError::ZeroFeatures`]            | rows have zero feature columns            |
    /// | [`SvmError::LabelCountMismatch`]      | `features.len() != labels.len()`          |
    /// | [`SvmError::FeatureCountMismatch`]    | rows have inconsistent lengths            |
    /// | [`SvmError::NonFiniteValue`]          | any value is NaN or infinite              |
    /// | [`SvmError::DegenerateTrainingSet`]   | fewer than two distinct classes           |
    /// | [`SvmError::EmptyClass`]              | a class index below the maximum is unused |
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<SupportVectorClassifier, SvmError> {
        crate::model::train(self, features, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_table() {
        let cfg = SvmConfig::new();
        assert_eq!(cfg.c(), 7.0);
        assert_eq!(cfg.gamma(), 0.1);
        assert_eq!(cfg.tol(), 1e-3);
        assert_eq!(cfg.calibration_folds(), 5);
        assert_eq!(cfg.seed(), 42);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_c() {
        let err = SvmConfig::new().with_c(0.0).validate().unwrap_err();
        assert!(matches!(err, SvmError::InvalidC { .. }));
    }

    #[test]
    fn rejects_nan_gamma() {
        let err = SvmConfig::new().with_gamma(f64::NAN).validate().unwrap_err();
        assert!(matches!(err, SvmError::InvalidGamma { .. }));
    }

    #[test]
    fn rejects_single_calibration_fold() {
        let err = SvmConfig::new()
            .with_calibration_folds(1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SvmError::InvalidCalibrationFolds { folds: 1 }));
    }
}
