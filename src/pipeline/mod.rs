//! Pipeline module - load, featurize, train, evaluate and permute

pub mod error;
pub mod features;
pub mod importance;
pub mod label;
pub mod loader;
pub mod matrix;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod schema;
pub mod split;
pub mod text;

pub use error::{AnalysisError, Result};
pub use features::{
    FeatureGroup, FeatureLayout, FeaturePipeline, FeatureSlot, FeatureSource, FittedPipeline,
    PipelineVariant,
};
pub use importance::{permutation_importance, FeatureImportance, PermutationConfig, PermutationImportance};
pub use label::label_values;
pub use loader::{load_dataset, load_dataset_with_progress};
pub use matrix::FeatureMatrix;
pub use metrics::{evaluate, BinaryMetrics, ImportanceMetric};
pub use model::{LinearBinaryModel, LogisticRegressionTrainer, Scorer, TrainedModel};
pub use normalize::{Normalizer, NormalizerKind};
pub use schema::{ColumnKind, ColumnSchema, ColumnSpec};
pub use split::train_test_split;
