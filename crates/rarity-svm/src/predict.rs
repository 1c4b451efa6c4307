//! Prediction methods for the support vector classifier.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::SvmError;
use crate::model::SupportVectorClassifier;
use crate::platt::{MIN_PROB, couple};

/// Class probability distribution from a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Return the most probable class (argmax of probabilities).
    #[must_use]
    pub fn most_probable_class(&self) -> usize {
        self.probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    /// Return the largest class probability.
    #[must_use]
    pub fn max_probability(&self) -> f64 {
        self.probs.iter().copied().fold(0.0, f64::max)
    }

    /// Return the probability assigned to `class`, or 0 if out of range.
    #[must_use]
    pub fn probability(&self, class: usize) -> f64 {
        self.probs.get(class).copied().unwrap_or(0.0)
    }

    /// Return the top-k classes sorted by descending probability.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<(usize, f64)> {
        let mut indexed: Vec<(usize, f64)> = self.probs.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(k);
        indexed
    }

    /// Return the probability distribution as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }
}

impl SupportVectorClassifier {
    fn check_width(&self, sample: &[f64]) -> Result<(), SvmError> {
        if sample.len() != self.n_features {
            return Err(SvmError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(())
    }

    /// Return one decision value per class pair, in pair order.
    ///
    /// # Errors
    ///
    /// Returns [`SvmError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn decision_values(&self, sample: &[f64]) -> Result<Vec<f64>, SvmError> {
        self.check_width(sample)?;
        Ok(self
            .pairs
            .iter()
            .map(|pair| pair.decision_value(&self.kernel, sample))
            .collect())
    }

    /// Predict the class for a single sample by one-vs-one voting.
    ///
    /// Ties go to the lowest class index.
    ///
    /// # Errors
    ///
    /// Returns [`SvmError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, SvmError> {
        let decision = self.decision_values(sample)?;
        let mut votes = vec![0usize; self.n_classes];
        for (pair, &f) in self.pairs.iter().zip(&decision) {
            if f > 0.0 {
                votes[pair.positive] += 1;
            } else {
                votes[pair.negative] += 1;
            }
        }
        let mut best = 0;
        for (class, &v) in votes.iter().enumerate() {
            if v > votes[best] {
                best = class;
            }
        }
        Ok(best)
    }

    /// Return the calibrated class probability distribution for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`SvmError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, SvmError> {
        let decision = self.decision_values(sample)?;
        let k = self.n_classes;
        let mut pairwise = vec![vec![0.0f64; k]; k];
        for (pair, &f) in self.pairs.iter().zip(&decision) {
            let p = pair.sigmoid.probability(f).clamp(MIN_PROB, 1.0 - MIN_PROB);
            pairwise[pair.positive][pair.negative] = p;
            pairwise[pair.negative][pair.positive] = 1.0 - p;
        }
        Ok(ClassDistribution::new(couple(&pairwise, k)))
    }

    /// Predict classes for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`SvmError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, SvmError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return probability distributions for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`SvmError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_proba_batch(
        &self,
        features: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, SvmError> {
        features
            .into_par_iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    /// Return the number of features the classifier was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of pairwise models.
    #[must_use]
    pub fn n_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// Return the total number of stored support vectors across all pairs.
    #[must_use]
    pub fn n_support(&self) -> usize {
        self.pairs.iter().map(|p| p.support_vectors.len()).sum()
    }

    /// Return the kernel.
    #[must_use]
    pub fn kernel(&self) -> &crate::kernel::RbfKernel {
        &self.kernel
    }

    /// Return the regularization strength used at fit time.
    #[must_use]
    pub fn c(&self) -> f64 {
        self.c
    }
}

#[cfg(test)]
mod tests {
    use super::ClassDistribution;
    use crate::config::SvmConfig;

    fn two_blobs() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..12 {
            let jitter = (i % 4) as f64 * 0.3;
            features.push(vec![jitter, 1.0 + jitter]);
            labels.push(0);
            features.push(vec![6.0 + jitter, 7.0 - jitter]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn distribution_argmax_and_top_k() {
        let dist = ClassDistribution::new(vec![0.2, 0.5, 0.3]);
        assert_eq!(dist.most_probable_class(), 1);
        assert_eq!(dist.max_probability(), 0.5);
        assert_eq!(dist.top_k(2), vec![(1, 0.5), (2, 0.3)]);
        assert_eq!(dist.probability(9), 0.0);
    }

    #[test]
    fn probabilities_sum_to_one_and_are_bounded() {
        let (features, labels) = two_blobs();
        let model = SvmConfig::new().fit(&features, &labels).unwrap();
        for sample_row in [[0.0, 1.0], [6.0, 7.0], [3.0, 4.0]] {
            let dist = model.predict_proba(&sample_row).unwrap();
            let total: f64 = dist.as_slice().iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "total = {total}");
            assert!(dist.as_slice().iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn confident_on_blob_centers() {
        let (features, labels) = two_blobs();
        let model = SvmConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(model.predict(&[0.3, 1.3]).unwrap(), 0);
        assert_eq!(model.predict(&[6.3, 6.7]).unwrap(), 1);
        let dist = model.predict_proba(&[6.3, 6.7]).unwrap();
        assert_eq!(dist.most_probable_class(), 1);
        assert!(dist.max_probability() > 0.5);
    }

    #[test]
    fn batch_matches_individual() {
        let (features, labels) = two_blobs();
        let model = SvmConfig::new().fit(&features, &labels).unwrap();
        let batch = model.predict_proba_batch(&features).unwrap();
        for (i, sample) in features.iter().enumerate() {
            let single = model.predict_proba(sample).unwrap();
            assert_eq!(batch[i].as_slice(), single.as_slice());
        }
        let classes = model.predict_batch(&features).unwrap();
        assert_eq!(classes.len(), features.len());
    }

    #[test]
    fn wrong_width_is_rejected() {
        let (features, labels) = two_blobs();
        let model = SvmConfig::new().fit(&features, &labels).unwrap();
        let err = model.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            crate::SvmError::PredictionFeatureMismatch {
                expected: 2,
                got: 1
            }
        ));
    }
}
