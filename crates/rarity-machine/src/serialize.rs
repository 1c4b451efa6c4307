//! Machine persistence via bincode.

use std::path::Path;

use rarity_resample::{RandomUnderSamplerConfig, SmoteConfig};
use rarity_svm::{SupportVectorClassifier, SvmConfig};
use tracing::{debug, info, instrument};

use crate::config::MachineConfig;
use crate::error::{MachineError, PersistenceError};
use crate::machine::{Machine, ResamplerState};

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// Identifies the model family stored in an artifact.
const MODEL_KIND: &str = "rbf-svc-ovo";

/// Leading fields of every envelope version. Decoded first, so a file from
/// another format version is reported as such even when the rest of its
/// layout differs.
#[derive(serde::Deserialize)]
struct EnvelopeHeader {
    format_version: u32,
    model_kind: String,
}

/// Versioned envelope for a saved machine. Must begin with the
/// [`EnvelopeHeader`] fields, in order.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Model family tag.
    model_kind: String,
    name: String,
    timestamp: String,
    /// Classifier hyperparameters, duplicated for inspection without decoding the model.
    hyperparameters: SvmConfig,
    classes: Vec<String>,
    feature_names: Vec<String>,
    config: MachineConfig,
    classifier: SupportVectorClassifier,
    oversampling: ResamplerState<SmoteConfig>,
    undersampling: ResamplerState<RandomUnderSamplerConfig>,
}

impl Machine {
    /// Save the machine to a binary file.
    ///
    /// The whole fitted state is written: classifier, resampler states,
    /// class names, feature names and timestamp.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PersistenceError::SerializeModel`] | bincode encoding failed |
    /// | [`PersistenceError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MachineError> {
        let path = path.as_ref();

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            model_kind: MODEL_KIND.to_string(),
            name: self.name.clone(),
            timestamp: self.timestamp.clone(),
            hyperparameters: self.config.svm().clone(),
            classes: self.classes.clone(),
            feature_names: self.feature_names.clone(),
            config: self.config.clone(),
            classifier: self.classifier.clone(),
            oversampling: self.oversampling.clone(),
            undersampling: self.undersampling.clone(),
        };

        let bytes = bincode::serialize(&envelope)
            .map_err(|e| PersistenceError::SerializeModel { source: e })?;

        std::fs::write(path, &bytes).map_err(|e| PersistenceError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_classes = self.classes.len(),
            "model saved"
        );

        Ok(())
    }

    /// Open a machine saved with [`Machine::save`].
    ///
    /// No retraining happens; the reopened machine predicts exactly as the
    /// saved one did.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PersistenceError::ReadModel`] | file read failed |
    /// | [`PersistenceError::DeserializeModel`] | bincode decoding failed |
    /// | [`PersistenceError::IncompatibleVersion`] | format version mismatch |
    /// | [`PersistenceError::IncompatibleModelKind`] | artifact holds another model family |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MachineError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| PersistenceError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let decode_error = |e| PersistenceError::DeserializeModel {
            path: path.to_path_buf(),
            source: e,
        };

        let header: EnvelopeHeader = bincode::deserialize(&bytes).map_err(decode_error)?;
        if header.format_version != FORMAT_VERSION {
            return Err(PersistenceError::IncompatibleVersion {
                expected: FORMAT_VERSION,
                found: header.format_version,
                path: path.to_path_buf(),
            }
            .into());
        }
        if header.model_kind != MODEL_KIND {
            return Err(PersistenceError::IncompatibleModelKind {
                expected: MODEL_KIND.to_string(),
                found: header.model_kind,
                path: path.to_path_buf(),
            }
            .into());
        }

        let envelope: ModelEnvelope = bincode::deserialize(&bytes).map_err(decode_error)?;

        debug!(
            n_classes = envelope.classes.len(),
            n_support = envelope.classifier.n_support(),
            timestamp = envelope.timestamp.as_str(),
            "model loaded"
        );

        Ok(Machine {
            name: envelope.name,
            timestamp: envelope.timestamp,
            config: envelope.config,
            classes: envelope.classes,
            feature_names: envelope.feature_names,
            classifier: envelope.classifier,
            oversampling: envelope.oversampling,
            undersampling: envelope.undersampling,
        })
    }
}
