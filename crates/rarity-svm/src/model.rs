//! One-vs-one training with parallel pairwise solves.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::SvmConfig;
use crate::error::SvmError;
use crate::kernel::RbfKernel;
use crate::platt::{Sigmoid, cross_validated_decision_values};
use crate::smo::{BinaryFit, SolverParams};

/// Binary decision function separating class `positive` (+1) from `negative` (-1).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct PairwiseModel {
    pub(crate) positive: usize,
    pub(crate) negative: usize,
    pub(crate) support_vectors: Vec<Vec<f64>>,
    pub(crate) coefficients: Vec<f64>,
    pub(crate) rho: f64,
    pub(crate) sigmoid: Sigmoid,
}

impl PairwiseModel {
    #[inline]
    pub(crate) fn decision_value(&self, kernel: &RbfKernel, x: &[f64]) -> f64 {
        let sum: f64 = self
            .support_vectors
            .iter()
            .zip(&self.coefficients)
            .map(|(sv, coef)| coef * kernel.eval(sv, x))
            .sum();
        sum - self.rho
    }
}

/// A fitted RBF support vector classifier.
///
/// Holds one [`PairwiseModel`] per class pair `(i, j)` with `i < j`, in
/// lexicographic order. Immutable after fitting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SupportVectorClassifier {
    pub(crate) kernel: RbfKernel,
    pub(crate) c: f64,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) pairs: Vec<PairwiseModel>,
}

fn validate_inputs(features: &[Vec<f64>], labels: &[usize]) -> Result<usize, SvmError> {
    if features.is_empty() {
        return Err(SvmError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(SvmError::LabelCountMismatch {
            n_features: features.len(),
            n_labels: labels.len(),
        });
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(SvmError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(SvmError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(SvmError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }
    Ok(n_features)
}

/// Train the pairwise ensemble.
#[instrument(skip_all, fields(n_samples = features.len()))]
pub(crate) fn train(
    config: &SvmConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<SupportVectorClassifier, SvmError> {
    config.validate()?;
    let n_features = validate_inputs(features, labels)?;

    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (i, &label) in labels.iter().enumerate() {
        members[label].push(i);
    }
    let n_present = members.iter().filter(|m| !m.is_empty()).count();
    if n_present < 2 {
        return Err(SvmError::DegenerateTrainingSet {
            n_classes: n_present,
        });
    }
    if let Some(class) = members.iter().position(Vec::is_empty) {
        return Err(SvmError::EmptyClass { class, n_classes });
    }

    let kernel = RbfKernel::new(config.gamma);
    let params = SolverParams {
        kernel,
        c: config.c,
        tol: config.tol,
        max_iter: config.max_iter,
    };
    let folds = config.calibration_folds;

    let class_pairs: Vec<(usize, usize)> = (0..n_classes)
        .flat_map(|i| ((i + 1)..n_classes).map(move |j| (i, j)))
        .collect();

    info!(
        n_samples = features.len(),
        n_features,
        n_classes,
        n_pairs = class_pairs.len(),
        c = config.c,
        gamma = config.gamma,
        "training support vector classifier"
    );

    // Per-pair seeds from the master RNG keep results independent of scheduling.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let jobs: Vec<((usize, usize), u64)> = class_pairs
        .into_iter()
        .map(|pair| (pair, master_rng.r#gen()))
        .collect();

    let pairs: Vec<PairwiseModel> = jobs
        .into_par_iter()
        .map(|((positive, negative), seed)| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let indices: Vec<usize> = members[positive]
                .iter()
                .chain(&members[negative])
                .copied()
                .collect();
            let rows: Vec<&[f64]> = indices.iter().map(|&i| features[i].as_slice()).collect();
            let y: Vec<f64> = indices
                .iter()
                .map(|&i| if labels[i] == positive { 1.0 } else { -1.0 })
                .collect();

            let decision = cross_validated_decision_values(&rows, &y, &params, folds, &mut rng);
            let sigmoid = Sigmoid::fit(&decision, &y);

            let fit = BinaryFit::train(&rows, &y, &params);
            debug!(
                positive,
                negative,
                n_support = fit.support_vectors.len(),
                rho = fit.rho,
                a = sigmoid.a(),
                b = sigmoid.b(),
                "pairwise model trained"
            );

            PairwiseModel {
                positive,
                negative,
                support_vectors: fit.support_vectors,
                coefficients: fit.coefficients,
                rho: fit.rho,
                sigmoid,
            }
        })
        .collect();

    let classifier = SupportVectorClassifier {
        kernel,
        c: config.c,
        n_features,
        n_classes,
        pairs,
    };

    info!(
        n_support = classifier.n_support(),
        "support vector classifier training complete"
    );

    Ok(classifier)
}

#[cfg(test)]
mod tests {
    use crate::config::SvmConfig;
    use crate::error::SvmError;

    /// Three tight, well separated groups in two dimensions.
    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for class in 0..3 {
            for i in 0..15 {
                let offset = class as f64 * 8.0;
                features.push(vec![offset + (i % 5) as f64 * 0.2, offset + (i / 5) as f64 * 0.2]);
                labels.push(class);
            }
        }
        (features, labels)
    }

    #[test]
    fn three_class_separable_accuracy() {
        let (features, labels) = make_separable_data();
        let model = SvmConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(model.n_classes(), 3);
        assert_eq!(model.n_pairs(), 3);

        let predictions = model.predict_batch(&features).unwrap();
        let correct = predictions
            .iter()
            .zip(&labels)
            .filter(|&(&p, &l)| p == l)
            .count();
        let accuracy = correct as f64 / labels.len() as f64;
        assert!(accuracy > 0.95, "accuracy = {accuracy}");
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = make_separable_data();
        let a = SvmConfig::new().with_seed(7).fit(&features, &labels).unwrap();
        let b = SvmConfig::new().with_seed(7).fit(&features, &labels).unwrap();
        let sample_row = [4.0, 4.0];
        assert_eq!(
            a.predict_proba(&sample_row).unwrap().as_slice(),
            b.predict_proba(&sample_row).unwrap().as_slice()
        );
    }

    #[test]
    fn single_class_is_degenerate() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![0, 0, 0];
        let err = SvmConfig::new().fit(&features, &labels).unwrap_err();
        assert!(matches!(err, SvmError::DegenerateTrainingSet { n_classes: 1 }));
    }

    #[test]
    fn gap_in_labels_is_rejected() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![0, 2, 2];
        let err = SvmConfig::new().fit(&features, &labels).unwrap_err();
        assert!(matches!(err, SvmError::EmptyClass { class: 1, .. }));
    }

    #[test]
    fn empty_dataset_error() {
        let err = SvmConfig::new().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, SvmError::EmptyDataset));
    }

    #[test]
    fn non_finite_value_error() {
        let features = vec![vec![1.0], vec![f64::INFINITY]];
        let err = SvmConfig::new().fit(&features, &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            SvmError::NonFiniteValue {
                sample_index: 1,
                feature_index: 0
            }
        ));
    }

    #[test]
    fn ragged_rows_error() {
        let features = vec![vec![1.0, 2.0], vec![3.0]];
        let err = SvmConfig::new().fit(&features, &[0, 1]).unwrap_err();
        assert!(matches!(err, SvmError::FeatureCountMismatch { .. }));
    }
}
