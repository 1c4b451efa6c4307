use std::collections::BTreeMap;

use crate::error::ResampleError;

/// Check shape and finiteness of a `(features, labels)` pair.
pub(crate) fn validate(features: &[Vec<f64>], labels: &[usize]) -> Result<(), ResampleError> {
    if features.is_empty() {
        return Err(ResampleError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(ResampleError::LabelCountMismatch {
            n_features: features.len(),
            n_labels: labels.len(),
        });
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ResampleError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ResampleError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ResampleError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(())
}

/// Row indices of each class present in `labels`, in ascending class order.
pub(crate) fn members_by_class(labels: &[usize]) -> BTreeMap<usize, Vec<usize>> {
    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        members.entry(label).or_default().push(i);
    }
    members
}

/// Sample count of each class present in `labels`.
pub(crate) fn class_counts(labels: &[usize]) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}
