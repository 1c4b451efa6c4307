//! Pipeline configuration.

use rarity_resample::{RandomUnderSamplerConfig, SmoteConfig};
use rarity_svm::SvmConfig;

/// Configuration for every stage of a [`Machine`](crate::Machine).
///
/// # Defaults
///
/// | Stage          | Default                                   |
/// |----------------|-------------------------------------------|
/// | oversampling   | SMOTE, `k_neighbors = 4`, `seed = 42`     |
/// | undersampling  | random, `seed = 42`                       |
/// | classifier     | RBF SVC, `C = 7`, `gamma = 0.1`, `seed = 42` |
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MachineConfig {
    smote: SmoteConfig,
    undersampling: RandomUnderSamplerConfig,
    svm: SvmConfig,
}

impl MachineConfig {
    /// Create a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the oversampling stage configuration.
    #[must_use]
    pub fn with_smote(mut self, smote: SmoteConfig) -> Self {
        self.smote = smote;
        self
    }

    /// Replace the undersampling stage configuration.
    #[must_use]
    pub fn with_undersampling(mut self, undersampling: RandomUnderSamplerConfig) -> Self {
        self.undersampling = undersampling;
        self
    }

    /// Replace the classifier configuration.
    #[must_use]
    pub fn with_svm(mut self, svm: SvmConfig) -> Self {
        self.svm = svm;
        self
    }

    /// Set the seed of all three stages.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.smote = self.smote.with_seed(seed);
        self.undersampling = self.undersampling.with_seed(seed);
        self.svm = self.svm.with_seed(seed);
        self
    }

    /// Return the oversampling configuration.
    #[must_use]
    pub fn smote(&self) -> &SmoteConfig {
        &self.smote
    }

    /// Return the undersampling configuration.
    #[must_use]
    pub fn undersampling(&self) -> &RandomUnderSamplerConfig {
        &self.undersampling
    }

    /// Return the classifier configuration.
    #[must_use]
    pub fn svm(&self) -> &SvmConfig {
        &self.svm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = MachineConfig::new();
        assert_eq!(cfg.smote().k_neighbors(), 4);
        assert_eq!(cfg.svm().c(), 7.0);
        assert_eq!(cfg.svm().gamma(), 0.1);
        assert_eq!(cfg.undersampling().seed(), 42);
    }

    #[test]
    fn with_seed_reaches_every_stage() {
        let cfg = MachineConfig::new().with_seed(9);
        assert_eq!(cfg.smote().seed(), 9);
        assert_eq!(cfg.undersampling().seed(), 9);
        assert_eq!(cfg.svm().seed(), 9);
    }
}
