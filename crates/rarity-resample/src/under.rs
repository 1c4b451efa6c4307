//! Random undersampling down to the smallest class.

use rand::SeedableRng;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::dataset::{class_counts, members_by_class, validate};
use crate::error::ResampleError;
use crate::result::{ResampleResult, SamplingPlan};

/// Configuration for random undersampling.
///
/// Every class is reduced, without replacement, to the size of the smallest
/// class. Classes already at that size are kept whole.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RandomUnderSamplerConfig {
    seed: u64,
}

impl Default for RandomUnderSamplerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomUnderSamplerConfig {
    /// Create a config with seed 42.
    #[must_use]
    pub fn new() -> Self {
        Self { seed: 42 }
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw the same number of rows from every class.
    ///
    /// Output is grouped by ascending class; within a class the original row
    /// order is preserved.
    ///
    /// # Errors
    ///
    /// Same shape and finiteness errors as [`SmoteConfig::fit_resample`](crate::SmoteConfig::fit_resample).
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit_resample(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<ResampleResult, ResampleError> {
        validate(features, labels)?;

        let before = class_counts(labels);
        let target = before.values().copied().min().unwrap_or(0);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut out_features = Vec::with_capacity(target * before.len());
        let mut out_labels = Vec::with_capacity(target * before.len());

        for (class, members) in members_by_class(labels) {
            let mut chosen: Vec<usize> = if members.len() == target {
                (0..target).collect()
            } else {
                index::sample(&mut rng, members.len(), target).into_vec()
            };
            chosen.sort_unstable();
            for pos in chosen {
                out_features.push(features[members[pos]].clone());
                out_labels.push(class);
            }
        }

        let after = class_counts(&out_labels);
        info!(
            n_before = features.len(),
            n_after = out_labels.len(),
            target,
            "random undersampling complete"
        );

        Ok(ResampleResult::new(
            out_features,
            out_labels,
            SamplingPlan::new(before, after),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(vec![i as f64]);
            labels.push(0);
        }
        for i in 0..4 {
            features.push(vec![100.0 + i as f64]);
            labels.push(1);
        }
        for i in 0..9 {
            features.push(vec![200.0 + i as f64]);
            labels.push(2);
        }
        (features, labels)
    }

    #[test]
    fn every_class_reduced_to_minimum() {
        let (features, labels) = skewed();
        let result = RandomUnderSamplerConfig::new()
            .fit_resample(&features, &labels)
            .unwrap();
        assert_eq!(result.n_samples(), 12);
        for count in result.plan().after().values() {
            assert_eq!(*count, 4);
        }
        assert_eq!(result.plan().removed()[&0], 16);
        assert_eq!(result.plan().removed()[&1], 0);
    }

    #[test]
    fn output_rows_come_from_input() {
        let (features, labels) = skewed();
        let result = RandomUnderSamplerConfig::new()
            .fit_resample(&features, &labels)
            .unwrap();
        for (row, &label) in result.features().iter().zip(result.labels()) {
            let pos = features.iter().position(|f| f == row).expect("row must exist in input");
            assert_eq!(labels[pos], label);
        }
    }

    #[test]
    fn smallest_class_kept_whole_and_in_order() {
        let (features, labels) = skewed();
        let result = RandomUnderSamplerConfig::new()
            .fit_resample(&features, &labels)
            .unwrap();
        let class_one: Vec<f64> = result
            .features()
            .iter()
            .zip(result.labels())
            .filter(|&(_, &l)| l == 1)
            .map(|(r, _)| r[0])
            .collect();
        assert_eq!(class_one, vec![100.0, 101.0, 102.0, 103.0]);
    }

    #[test]
    fn same_seed_same_selection() {
        let (features, labels) = skewed();
        let cfg = RandomUnderSamplerConfig::new().with_seed(11);
        let a = cfg.fit_resample(&features, &labels).unwrap();
        let b = cfg.fit_resample(&features, &labels).unwrap();
        assert_eq!(a.features(), b.features());
    }

    #[test]
    fn empty_input_rejected() {
        let err = RandomUnderSamplerConfig::new()
            .fit_resample(&[], &[])
            .unwrap_err();
        assert!(matches!(err, ResampleError::EmptyDataset));
    }
}
