//! Juvenile fish risk zoning and advisory generation.
//!
//! Pipeline order:
//!   1. Feature derivation from the fisheries CSV snapshot (`dataset`)
//!   2. Risk indicator scoring (`risk`)
//!   3. Zone classifier training (`classifier`)
//!   4. Advisory rule engine (`advisory`)
//!   5. State queries and heat-map points (`query`)
//!
//! `pipeline::load_and_train` runs steps 1 and 3 once and hands back an
//! immutable `AdvisoryContext` that serves steps 4 and 5.

pub mod advisory;
pub mod classifier;
pub mod dataset;
pub mod pipeline;
pub mod query;
pub mod risk;
pub mod zone;

pub use advisory::{build_advisory, Advisory, AdvisoryError};
pub use classifier::{train_zone_classifier, ClassifierError, TrainParams, ZoneClassifier, ZoneForest};
pub use dataset::{load_dataset, Dataset, DatasetError, DerivedRecord, FeatureRow};
pub use pipeline::{load_and_train, AdvisoryContext, PipelineError};
pub use query::{HeatmapPoint, HeatmapWeight, QueryError};
pub use zone::Zone;
