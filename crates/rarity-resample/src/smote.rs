//! Synthetic minority oversampling (SMOTE).

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::dataset::{class_counts, members_by_class, validate};
use crate::error::ResampleError;
use crate::neighbors::k_nearest;
use crate::result::{ResampleResult, SamplingPlan};

/// Default number of same-class neighbours to interpolate towards.
pub const DEFAULT_K_NEIGHBORS: usize = 4;

/// Configuration for SMOTE oversampling.
///
/// Every class smaller than the majority is grown to the majority count.
/// A minority class needs at least `k_neighbors + 1` samples.
///
/// # Defaults
///
/// | Parameter     | Default |
/// |---------------|---------|
/// | `k_neighbors` | 4       |
/// | `seed`        | 42      |
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SmoteConfig {
    k_neighbors: usize,
    seed: u64,
}

impl Default for SmoteConfig {
    fn default() -> Self {
        Self {
            k_neighbors: DEFAULT_K_NEIGHBORS,
            seed: 42,
        }
    }
}

impl SmoteConfig {
    /// Create a config with the given neighbour count.
    ///
    /// # Errors
    ///
    /// Returns [`ResampleError::InvalidNeighborCount`] if `k_neighbors` is zero.
    pub fn new(k_neighbors: usize) -> Result<Self, ResampleError> {
        if k_neighbors == 0 {
            return Err(ResampleError::InvalidNeighborCount { k_neighbors });
        }
        Ok(Self {
            k_neighbors,
            ..Self::default()
        })
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the neighbour count.
    #[must_use]
    pub fn k_neighbors(&self) -> usize {
        self.k_neighbors
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Oversample every minority class up to the majority count.
    ///
    /// Original rows come first, unchanged; synthetic rows follow, grouped
    /// by ascending class.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ResampleError::EmptyDataset`] | zero samples |
    /// | [`ResampleError::LabelCountMismatch`] | features and labels differ in length |
    /// | [`ResampleError::ZeroFeatures`] | rows have no columns |
    /// | [`ResampleError::FeatureCountMismatch`] | ragged rows |
    /// | [`ResampleError::NonFiniteValue`] | NaN or infinite value |
    /// | [`ResampleError::InsufficientSamples`] | a minority class has `<= k_neighbors` samples |
    #[instrument(skip_all, fields(n_samples = features.len(), k_neighbors = self.k_neighbors))]
    pub fn fit_resample(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<ResampleResult, ResampleError> {
        validate(features, labels)?;

        let before = class_counts(labels);
        let majority = before.values().copied().max().unwrap_or(0);
        let required = self.k_neighbors + 1;

        // Fail before generating anything.
        for (&class, &count) in &before {
            if count < majority && count < required {
                return Err(ResampleError::InsufficientSamples {
                    class,
                    count,
                    required,
                    k_neighbors: self.k_neighbors,
                });
            }
        }

        let mut out_features = features.to_vec();
        let mut out_labels = labels.to_vec();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        for (class, members) in members_by_class(labels) {
            let n_new = majority - members.len();
            if n_new == 0 {
                continue;
            }

            let rows: Vec<&[f64]> = members.iter().map(|&i| features[i].as_slice()).collect();
            let neighbours = k_nearest(&rows, self.k_neighbors);

            out_features.reserve(n_new);
            out_labels.reserve(n_new);
            for _ in 0..n_new {
                let base = rng.gen_range(0..rows.len());
                let neighbour = neighbours[base][rng.gen_range(0..self.k_neighbors)];
                let step: f64 = rng.r#gen();
                let synthetic: Vec<f64> = rows[base]
                    .iter()
                    .zip(rows[neighbour])
                    .map(|(&x, &nn)| x + step * (nn - x))
                    .collect();
                out_features.push(synthetic);
                out_labels.push(class);
            }
            debug!(class, n_original = members.len(), n_new, "class oversampled");
        }

        let after = class_counts(&out_labels);
        info!(
            n_before = features.len(),
            n_after = out_labels.len(),
            majority,
            "SMOTE oversampling complete"
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

    fn imbalanced() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            features.push(vec![i as f64 * 0.1, 1.0]);
            labels.push(0);
        }
        for i in 0..6 {
            features.push(vec![10.0 + i as f64, 20.0 - i as f64]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn minority_grows_to_majority() {
        let (features, labels) = imbalanced();
        let result = SmoteConfig::default().fit_resample(&features, &labels).unwrap();
        assert_eq!(result.n_samples(), 60);
        assert_eq!(result.plan().after()[&0], 30);
        assert_eq!(result.plan().after()[&1], 30);
        assert_eq!(result.plan().added()[&1], 24);
    }

    #[test]
    fn original_rows_are_kept_in_front() {
        let (features, labels) = imbalanced();
        let result = SmoteConfig::default().fit_resample(&features, &labels).unwrap();
        assert_eq!(&result.features()[..features.len()], features.as_slice());
        assert_eq!(&result.labels()[..labels.len()], labels.as_slice());
        assert!(result.labels()[labels.len()..].iter().all(|&l| l == 1));
    }

    #[test]
    fn synthetic_rows_stay_inside_class_hull() {
        let (features, labels) = imbalanced();
        let result = SmoteConfig::default().fit_resample(&features, &labels).unwrap();
        for row in &result.features()[features.len()..] {
            assert!((10.0..=15.0).contains(&row[0]), "row = {row:?}");
            assert!((15.0..=20.0).contains(&row[1]), "row = {row:?}");
            // Class 1 lies on the line x + y = 30.
            assert!((row[0] + row[1] - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn same_seed_same_output() {
        let (features, labels) = imbalanced();
        let a = SmoteConfig::default().with_seed(3).fit_resample(&features, &labels).unwrap();
        let b = SmoteConfig::default().with_seed(3).fit_resample(&features, &labels).unwrap();
        assert_eq!(a.features(), b.features());
    }

    #[test]
    fn too_small_minority_is_rejected() {
        let (mut features, mut labels) = imbalanced();
        features.push(vec![50.0, 50.0]);
        labels.push(2);
        let err = SmoteConfig::default().fit_resample(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            ResampleError::InsufficientSamples {
                class: 2,
                count: 1,
                required: 5,
                ..
            }
        ));
    }

    #[test]
    fn balanced_input_is_unchanged() {
        let features = vec![vec![0.0], vec![1.0], vec![5.0], vec![6.0]];
        let labels = vec![0, 0, 1, 1];
        let result = SmoteConfig::default().fit_resample(&features, &labels).unwrap();
        assert_eq!(result.features(), features.as_slice());
    }

    #[test]
    fn zero_neighbours_rejected() {
        assert!(matches!(
            SmoteConfig::new(0),
            Err(ResampleError::InvalidNeighborCount { k_neighbors: 0 })
        ));
    }
}
