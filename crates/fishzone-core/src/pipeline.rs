//! Load-once, train-once entry point.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::advisory::Advisory;
use crate::classifier::{train_zone_classifier, ClassifierError, EvaluationSummary, TrainParams, ZoneForest};
use crate::dataset::{load_dataset, Dataset, DatasetError};
use crate::query::{self, HeatmapPoint, HeatmapWeight};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Trained model, annotated table and held-out evaluation.
///
/// Never mutated after construction; share it behind an `Arc` and replace
/// the whole context to retrain.
#[derive(Debug, Clone)]
pub struct AdvisoryContext {
    model: ZoneForest,
    dataset: Dataset,
    evaluation: EvaluationSummary,
}

impl AdvisoryContext {
    /// Train on an already loaded dataset.
    pub fn from_dataset(dataset: Dataset, params: &TrainParams) -> Result<Self, PipelineError> {
        let (model, evaluation) = train_zone_classifier(&dataset.feature_rows(), &dataset.labels(), params)?;
        Ok(Self { model, dataset, evaluation })
    }

    pub fn advisories_for_state(&self, state: &str, river_label: Option<&str>) -> Vec<Advisory> {
        query::advisories_for_state(&self.model, &self.dataset, state, river_label)
    }

    pub fn heatmap_points(&self, state: &str, river_label: Option<&str>, weight: HeatmapWeight) -> Vec<HeatmapPoint> {
        query::heatmap_points(&self.dataset, state, river_label, weight)
    }

    pub fn available_states(&self) -> Vec<String> {
        query::available_states(&self.dataset)
    }

    pub fn available_rivers(&self, state: Option<&str>) -> Vec<String> {
        query::available_rivers(&self.dataset, state)
    }

    pub fn evaluation(&self) -> &EvaluationSummary {
        &self.evaluation
    }

    pub fn table(&self) -> &Dataset {
        &self.dataset
    }

    pub fn model(&self) -> &ZoneForest {
        &self.model
    }
}

/// Load the CSV at `path` and train the zone classifier on it.
pub fn load_and_train(path: impl AsRef<Path>, params: &TrainParams) -> Result<AdvisoryContext, PipelineError> {
    let path = path.as_ref();
    let dataset = load_dataset(path)?;
    info!(path = %path.display(), rows = dataset.len(), "dataset loaded");
    AdvisoryContext::from_dataset(dataset, params)
}
