//! The fitted pipeline and its prediction surface.

use std::fmt;

use rarity_io::Table;
use rarity_resample::{RandomUnderSamplerConfig, SamplingPlan, SmoteConfig};
use rarity_svm::SupportVectorClassifier;
use tracing::{debug, info, instrument};

use crate::config::MachineConfig;
use crate::error::MachineError;
use crate::schema::{FEATURE_COLUMNS, check_prediction_columns, encode_labels, feature_rows};

/// Display name of the model family.
pub const MODEL_NAME: &str = "Support Vector Machines";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

/// A resampling stage as it was applied during fitting.
///
/// Kept for provenance; never reapplied at prediction time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResamplerState<C> {
    config: C,
    plan: SamplingPlan,
}

impl<C> ResamplerState<C> {
    /// Return the stage configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Return the per-class counts before and after the stage.
    pub fn plan(&self) -> &SamplingPlan {
        &self.plan
    }
}

/// A predicted rarity and the probability the model assigns to its best class.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Prediction {
    /// Predicted class name.
    pub label: String,
    /// Largest per-class probability, in `[0, 1]`.
    pub confidence: f64,
}

/// A rarity classifier fitted on a labeled table.
///
/// Construction does all the work: it extracts the feature and label columns,
/// balances the classes, fits the classifier and stamps the creation time.
/// The result is immutable.
#[derive(Debug, Clone)]
pub struct Machine {
    pub(crate) name: String,
    pub(crate) timestamp: String,
    pub(crate) config: MachineConfig,
    pub(crate) classes: Vec<String>,
    pub(crate) feature_names: Vec<String>,
    pub(crate) classifier: SupportVectorClassifier,
    pub(crate) oversampling: ResamplerState<SmoteConfig>,
    pub(crate) undersampling: ResamplerState<RandomUnderSamplerConfig>,
}

impl Machine {
    /// Fit a machine with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`Machine::with_config`].
    pub fn new(table: &Table) -> Result<Self, MachineError> {
        Self::with_config(table, &MachineConfig::default())
    }

    /// Fit a machine on `table`.
    ///
    /// `table` must hold numeric `Level`, `Health`, `Energy` and `Sanity`
    /// columns and a text `Rarity` column; other columns are ignored.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MachineError::EmptyDataset`] | `table` has no rows |
    /// | [`MachineError::SchemaMismatch`] | a required column is missing or of the wrong kind |
    /// | [`MachineError::Resample`] | e.g. a minority class too small for SMOTE |
    /// | [`MachineError::Svm`] | e.g. only one distinct rarity |
    #[instrument(skip_all, fields(n_rows = table.n_rows()))]
    pub fn with_config(table: &Table, config: &MachineConfig) -> Result<Self, MachineError> {
        if table.is_empty() {
            return Err(MachineError::EmptyDataset);
        }

        let feature_names: Vec<String> = FEATURE_COLUMNS.iter().map(|s| (*s).to_string()).collect();
        let features = feature_rows(table, &feature_names)?;
        let (classes, labels) = encode_labels(table)?;
        debug!(n_classes = classes.len(), "labels encoded");

        let (features, labels, over_plan) =
            config.smote().fit_resample(&features, &labels)?.into_parts();
        debug!(n_samples = features.len(), "oversampling complete");

        let (features, labels, under_plan) = config
            .undersampling()
            .fit_resample(&features, &labels)?
            .into_parts();
        debug!(n_samples = features.len(), "undersampling complete");

        let classifier = config.svm().fit(&features, &labels)?;
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

        info!(
            n_classes = classes.len(),
            n_train = features.len(),
            n_support = classifier.n_support(),
            timestamp = timestamp.as_str(),
            "machine fitted"
        );

        Ok(Self {
            name: MODEL_NAME.to_string(),
            timestamp,
            config: config.clone(),
            classes,
            feature_names,
            classifier,
            oversampling: ResamplerState {
                config: config.smote().clone(),
                plan: over_plan,
            },
            undersampling: ResamplerState {
                config: config.undersampling().clone(),
                plan: under_plan,
            },
        })
    }

    fn prediction_rows(&self, table: &Table) -> Result<Vec<Vec<f64>>, MachineError> {
        check_prediction_columns(table, &self.feature_names)?;
        let rows = feature_rows(table, &self.feature_names)?;
        for (i, row) in rows.iter().enumerate() {
            self.check_finite(i, row)?;
        }
        Ok(rows)
    }

    fn check_finite(&self, row_index: usize, row: &[f64]) -> Result<(), MachineError> {
        match row.iter().position(|v| !v.is_finite()) {
            Some(j) => Err(MachineError::NonFiniteFeature {
                row: row_index,
                column: self
                    .feature_names
                    .get(j)
                    .cloned()
                    .unwrap_or_else(|| j.to_string()),
            }),
            None => Ok(()),
        }
    }

    /// Predict the rarity of a single-row feature table.
    ///
    /// `table` must have exactly the feature columns, numeric, in fit order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MachineError::SchemaMismatch`] | columns differ from the fit-time features |
    /// | [`MachineError::NonFiniteFeature`] | a feature value is NaN or infinite |
    /// | [`MachineError::ExpectedSingleRow`] | `table` does not have exactly one row |
    pub fn predict(&self, table: &Table) -> Result<Prediction, MachineError> {
        let rows = self.prediction_rows(table)?;
        match rows.as_slice() {
            [row] => self.predict_row(row),
            _ => Err(MachineError::ExpectedSingleRow { rows: rows.len() }),
        }
    }

    /// Predict every row of a feature table, in row order.
    ///
    /// # Errors
    ///
    /// [`MachineError::SchemaMismatch`] as for [`Machine::predict`];
    /// [`MachineError::EmptyDataset`] if `table` has no rows.
    #[instrument(skip_all, fields(n_rows = table.n_rows()))]
    pub fn predict_batch(&self, table: &Table) -> Result<Vec<Prediction>, MachineError> {
        let rows = self.prediction_rows(table)?;
        if rows.is_empty() {
            return Err(MachineError::EmptyDataset);
        }
        let classes = self.classifier.predict_batch(&rows)?;
        let dists = self.classifier.predict_proba_batch(&rows)?;
        Ok(classes
            .into_iter()
            .zip(dists)
            .map(|(class, dist)| Prediction {
                label: self.classes[class].clone(),
                confidence: dist.max_probability(),
            })
            .collect())
    }

    /// Predict a raw feature row given in [`FEATURE_COLUMNS`] order.
    ///
    /// # Errors
    ///
    /// Returns [`MachineError::Svm`] if the row has the wrong length, or
    /// [`MachineError::NonFiniteFeature`] if a value is NaN or infinite.
    pub fn predict_row(&self, row: &[f64]) -> Result<Prediction, MachineError> {
        self.check_finite(0, row)?;
        let class = self.classifier.predict(row)?;
        let dist = self.classifier.predict_proba(row)?;
        Ok(Prediction {
            label: self.classes[class].clone(),
            confidence: dist.max_probability(),
        })
    }

    /// Return each row's probability for every class, classes in sorted order.
    ///
    /// # Errors
    ///
    /// [`MachineError::SchemaMismatch`] and [`MachineError::NonFiniteFeature`]
    /// as for [`Machine::predict`]; [`MachineError::EmptyDataset`] if `table`
    /// has no rows.
    pub fn predict_proba(&self, table: &Table) -> Result<Vec<Vec<(String, f64)>>, MachineError> {
        let rows = self.prediction_rows(table)?;
        if rows.is_empty() {
            return Err(MachineError::EmptyDataset);
        }
        let dists = self.classifier.predict_proba_batch(&rows)?;
        Ok(dists
            .iter()
            .map(|dist| {
                self.classes
                    .iter()
                    .cloned()
                    .zip(dist.as_slice().iter().copied())
                    .collect()
            })
            .collect())
    }

    /// Return the model name and creation time, one per line.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("Base Model: {}\nTimestamp: {}", self.name, self.timestamp)
    }

    /// Return the model name and creation time as an HTML fragment,
    /// `Base Model:<name><br>Timestamp:<timestamp>`.
    #[must_use]
    pub fn describe_html(&self) -> String {
        format!("Base Model:{}<br>Timestamp:{}", self.name, self.timestamp)
    }

    /// Return the model name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the creation time, formatted `%Y-%m-%d %I:%M:%S %p`.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Return the class names in label-index order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Return the feature column names in fit order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the configuration the machine was fitted with.
    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Return the fitted classifier.
    #[must_use]
    pub fn classifier(&self) -> &SupportVectorClassifier {
        &self.classifier
    }

    /// Return the oversampling stage as applied.
    #[must_use]
    pub fn oversampling(&self) -> &ResamplerState<SmoteConfig> {
        &self.oversampling
    }

    /// Return the undersampling stage as applied.
    #[must_use]
    pub fn undersampling(&self) -> &ResamplerState<RandomUnderSamplerConfig> {
        &self.undersampling
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use rarity_io::Column;

    use super::*;

    /// Two well separated tiers: 30 Common and 8 Rare.
    fn two_tiers() -> Table {
        let mut level = Vec::new();
        let mut health = Vec::new();
        let mut energy = Vec::new();
        let mut sanity = Vec::new();
        let mut rarity = Vec::new();
        for i in 0..38 {
            let (base, name) = if i < 30 { (1.0, "Common") } else { (12.0, "Rare") };
            let jitter = (i % 4) as f64 * 0.25;
            level.push(base + jitter);
            health.push(base * 2.0 + jitter);
            energy.push(base * 1.5 - jitter);
            sanity.push(base + 2.0 * jitter);
            rarity.push(name.to_string());
        }
        Table::new(vec![
            Column::numeric("Level", level),
            Column::numeric("Health", health),
            Column::numeric("Energy", energy),
            Column::numeric("Sanity", sanity),
            Column::text("Rarity", rarity),
        ])
        .unwrap()
    }

    #[test]
    fn fit_records_provenance() {
        let machine = Machine::new(&two_tiers()).unwrap();
        assert_eq!(machine.name(), MODEL_NAME);
        assert_eq!(machine.classes(), ["Common", "Rare"]);
        assert_eq!(machine.feature_names(), FEATURE_COLUMNS);
        assert_eq!(machine.oversampling().plan().added().get(&1), Some(&22));
        assert_eq!(machine.undersampling().plan().after().get(&0), Some(&30));
        assert_eq!(machine.undersampling().plan().after().get(&1), Some(&30));
    }

    #[test]
    fn describe_lists_name_and_timestamp() {
        let machine = Machine::new(&two_tiers()).unwrap();
        let text = machine.describe();
        assert_eq!(
            text,
            format!("Base Model: Support Vector Machines\nTimestamp: {}", machine.timestamp())
        );
        assert_eq!(machine.to_string(), text);
        assert_eq!(
            machine.describe_html(),
            format!("Base Model:Support Vector Machines<br>Timestamp:{}", machine.timestamp())
        );
        assert!(
            chrono::NaiveDateTime::parse_from_str(machine.timestamp(), TIMESTAMP_FORMAT).is_ok(),
            "unparseable timestamp {}",
            machine.timestamp()
        );
    }

    #[test]
    fn predict_requires_single_row() {
        let machine = Machine::new(&two_tiers()).unwrap();
        let two_rows = Table::new(vec![
            Column::numeric("Level", vec![1.0, 12.0]),
            Column::numeric("Health", vec![2.0, 24.0]),
            Column::numeric("Energy", vec![1.5, 18.0]),
            Column::numeric("Sanity", vec![1.0, 12.0]),
        ])
        .unwrap();
        let err = machine.predict(&two_rows).unwrap_err();
        assert!(matches!(err, MachineError::ExpectedSingleRow { rows: 2 }));

        let batch = machine.predict_batch(&two_rows).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].label, "Common");
        assert_eq!(batch[1].label, "Rare");
    }

    #[test]
    fn probabilities_cover_every_class() {
        let machine = Machine::new(&two_tiers()).unwrap();
        let sample_row = Table::from_numeric_row(&FEATURE_COLUMNS, &[12.0, 24.0, 18.0, 12.0]).unwrap();
        let proba = machine.predict_proba(&sample_row).unwrap();
        assert_eq!(proba.len(), 1);
        let names: Vec<&str> = proba[0].iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Common", "Rare"]);
        let total: f64 = proba[0].iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);

        let prediction = machine.predict(&sample_row).unwrap();
        let best = proba[0].iter().map(|(_, p)| *p).fold(0.0, f64::max);
        assert_eq!(prediction.confidence, best);
    }

    #[test]
    fn non_finite_features_are_rejected() {
        let machine = Machine::new(&two_tiers()).unwrap();
        let sample_row = Table::from_numeric_row(&FEATURE_COLUMNS, &[f64::NAN, 1.0, 1.0, 1.0]).unwrap();
        let err = machine.predict(&sample_row).unwrap_err();
        assert!(matches!(
            err,
            MachineError::NonFiniteFeature { row: 0, ref column } if column == "Level"
        ));
        assert!(matches!(
            machine.predict_proba(&sample_row).unwrap_err(),
            MachineError::NonFiniteFeature { .. }
        ));

        let err = machine
            .predict_row(&[1.0, 2.0, f64::INFINITY, 1.0])
            .unwrap_err();
        assert!(matches!(
            err,
            MachineError::NonFiniteFeature { row: 0, ref column } if column == "Energy"
        ));
    }

    #[test]
    fn empty_prediction_tables_are_rejected() {
        let machine = Machine::new(&two_tiers()).unwrap();
        let empty = Table::new(
            FEATURE_COLUMNS
                .iter()
                .map(|name| Column::numeric(*name, Vec::new()))
                .collect(),
        )
        .unwrap();
        assert!(matches!(
            machine.predict_batch(&empty).unwrap_err(),
            MachineError::EmptyDataset
        ));
        assert!(matches!(
            machine.predict_proba(&empty).unwrap_err(),
            MachineError::EmptyDataset
        ));
        assert!(matches!(
            machine.predict(&empty).unwrap_err(),
            MachineError::ExpectedSingleRow { rows: 0 }
        ));
    }

    #[test]
    fn machine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Machine>();
    }
}
