//! Inference ports. Trained models behind traits so the use cases never
//! depend on a particular network representation.

use crate::domain::{DomainError, IntentMetadata, NormalizationMeta, ResponseCatalog};
use std::sync::Arc;

/// Number of regressor input features.
pub const CYCLE_FEATURES: usize = 6;

/// Maps a feature vector to a scalar.
pub trait RegressionModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64, DomainError>;
}

/// Maps a bag-of-words vector to a probability distribution over tags.
pub trait ClassificationModel: Send + Sync {
    fn predict_proba(&self, input: &[f64]) -> Result<Vec<f64>, DomainError>;
}

/// Loaded cycle regressor plus its normalization metadata.
#[derive(Clone)]
pub struct CycleModel {
    pub model: Arc<dyn RegressionModel>,
    pub meta: NormalizationMeta,
}

/// Loaded intent classifier with its vocabulary, tags and response catalog.
#[derive(Clone)]
pub struct IntentModel {
    pub model: Arc<dyn ClassificationModel>,
    pub metadata: IntentMetadata,
    /// Built-in templates overlaid with the artifact's `responses`.
    pub catalog: ResponseCatalog,
}

impl IntentModel {
    pub fn new(model: Arc<dyn ClassificationModel>, metadata: IntentMetadata) -> Self {
        let catalog = ResponseCatalog::builtin().overlaid_with(&metadata.responses);
        Self {
            model,
            metadata,
            catalog,
        }
    }
}
