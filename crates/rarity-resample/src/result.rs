//! Resampling outputs and the per-class plan that produced them.

use std::collections::BTreeMap;

/// Per-class sample counts before and after one resampling stage.
///
/// Kept alongside a fitted model as a record of how its training set was
/// rebalanced.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SamplingPlan {
    before: BTreeMap<usize, usize>,
    after: BTreeMap<usize, usize>,
}

impl SamplingPlan {
    pub(crate) fn new(before: BTreeMap<usize, usize>, after: BTreeMap<usize, usize>) -> Self {
        Self { before, after }
    }

    /// Class counts of the stage input.
    #[must_use]
    pub fn before(&self) -> &BTreeMap<usize, usize> {
        &self.before
    }

    /// Class counts of the stage output.
    #[must_use]
    pub fn after(&self) -> &BTreeMap<usize, usize> {
        &self.after
    }

    /// Number of rows added per class (zero for untouched classes).
    #[must_use]
    pub fn added(&self) -> BTreeMap<usize, usize> {
        self.after
            .iter()
            .map(|(&class, &n)| (class, n.saturating_sub(self.before.get(&class).copied().unwrap_or(0))))
            .collect()
    }

    /// Number of rows dropped per class (zero for untouched classes).
    #[must_use]
    pub fn removed(&self) -> BTreeMap<usize, usize> {
        self.before
            .iter()
            .map(|(&class, &n)| (class, n.saturating_sub(self.after.get(&class).copied().unwrap_or(0))))
            .collect()
    }
}

/// Rebalanced dataset produced by a resampling stage.
#[derive(Debug, Clone)]
pub struct ResampleResult {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    plan: SamplingPlan,
}

impl ResampleResult {
    pub(crate) fn new(features: Vec<Vec<f64>>, labels: Vec<usize>, plan: SamplingPlan) -> Self {
        debug_assert_eq!(features.len(), labels.len());
        Self {
            features,
            labels,
            plan,
        }
    }

    /// Return the feature rows.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the labels, aligned with [`features`](Self::features).
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the sampling plan.
    #[must_use]
    pub fn plan(&self) -> &SamplingPlan {
        &self.plan
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Consume the result into `(features, labels, plan)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Vec<f64>>, Vec<usize>, SamplingPlan) {
        (self.features, self.labels, self.plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_and_removed_are_complementary() {
        let before = BTreeMap::from([(0, 10), (1, 3)]);
        let after = BTreeMap::from([(0, 10), (1, 10)]);
        let plan = SamplingPlan::new(before, after);
        assert_eq!(plan.added(), BTreeMap::from([(0, 0), (1, 7)]));
        assert_eq!(plan.removed(), BTreeMap::from([(0, 0), (1, 0)]));
    }
}
