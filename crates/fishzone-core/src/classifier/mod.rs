//! Supervised zone classifier.
//!
//! Training pipeline:
//!   1. Stratified train/test split (`split`)
//!   2. Column preprocessing fitted on the training rows (`preprocess`)
//!   3. Class-weighted random forest (`forest`)
//!   4. Held-out evaluation (`evaluation`)

pub mod evaluation;
pub mod forest;
pub mod params;
pub mod preprocess;
pub mod split;

use thiserror::Error;
use tracing::info;

pub use evaluation::{ClassMetrics, ClassificationReport, EvaluationSummary};
pub use params::{ClassWeights, TrainParams};

use crate::dataset::FeatureRow;
use crate::zone::{Zone, N_ZONES};
use forest::{ForestConfig, RandomForest};
use preprocess::Preprocessor;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("training data holds {found} distinct zone(s); at least 2 are required")]
    TooFewClasses { found: usize },
    #[error("no training rows")]
    EmptyInput,
    #[error("{rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("invalid training parameters: {0}")]
    InvalidParams(String),
}

/// Anything that maps a feature row to a zone distribution.
pub trait ZoneClassifier {
    /// Probability per zone, indexed by `Zone::index`.
    fn predict_proba(&self, row: &FeatureRow) -> [f64; N_ZONES];

    /// Most probable zone and its probability. Ties resolve in Green, Red,
    /// Yellow order, so an even Yellow/Red split reports Red.
    fn predict(&self, row: &FeatureRow) -> (Zone, f64) {
        const TIE_ORDER: [Zone; N_ZONES] = [Zone::Green, Zone::Red, Zone::Yellow];

        let proba = self.predict_proba(row);
        let mut best = TIE_ORDER[0];
        for zone in &TIE_ORDER[1..] {
            if proba[zone.index()] > proba[best.index()] {
                best = *zone;
            }
        }
        (best, proba[best.index()].clamp(0.0, 1.0))
    }
}

/// Fitted preprocessor plus forest. Immutable after training.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneForest {
    preprocessor: Preprocessor,
    forest: RandomForest,
}

impl ZoneForest {
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

impl ZoneClassifier for ZoneForest {
    fn predict_proba(&self, row: &FeatureRow) -> [f64; N_ZONES] {
        self.forest.predict_proba(&self.preprocessor.transform(row))
    }
}

/// Train the zone forest on a stratified split of `rows` and evaluate it on
/// the held-out part.
pub fn train_zone_classifier(
    rows: &[FeatureRow],
    labels: &[Zone],
    params: &TrainParams,
) -> Result<(ZoneForest, EvaluationSummary), ClassifierError> {
    params.validate().map_err(ClassifierError::InvalidParams)?;
    if rows.is_empty() {
        return Err(ClassifierError::EmptyInput);
    }
    if rows.len() != labels.len() {
        return Err(ClassifierError::LengthMismatch { rows: rows.len(), labels: labels.len() });
    }

    let (train_idx, test_idx) = split::stratified_split(labels, params.test_fraction, params.seed)?;

    let preprocessor = Preprocessor::fit(train_idx.iter().map(|&i| &rows[i]));
    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| preprocessor.transform(&rows[i])).collect();
    let y_train: Vec<usize> = train_idx.iter().map(|&i| labels[i].index()).collect();

    info!(
        n_train = train_idx.len(),
        n_test = test_idx.len(),
        n_features = preprocessor.n_outputs(),
        n_estimators = params.n_estimators,
        "training zone forest"
    );

    let config = ForestConfig {
        n_estimators: params.n_estimators,
        max_depth: params.max_depth,
        min_samples_split: params.min_samples_split,
        min_samples_leaf: params.min_samples_leaf,
        class_weights: params.class_weights.as_array(),
        seed: params.seed,
    };
    let model = ZoneForest { forest: RandomForest::fit(&x_train, &y_train, &config), preprocessor };

    let y_true: Vec<Zone> = test_idx.iter().map(|&i| labels[i]).collect();
    let y_pred: Vec<Zone> = test_idx.iter().map(|&i| model.predict(&rows[i]).0).collect();
    let summary = evaluation::evaluate(&y_true, &y_pred, train_idx.len());

    info!(accuracy = summary.accuracy, "zone forest evaluated");
    Ok((model, summary))
}
