//! Feature extraction and model scoring ports.

use async_trait::async_trait;

use crate::domain::error::{ExtractionError, ModelError};
use crate::domain::models::FeatureVector;

/// Turns a URL into lexical and host features.
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<FeatureVector, ExtractionError>;
}

/// Trained model with a fixed input schema.
pub trait ClassifierModel: Send + Sync {
    /// Probability in `[0, 1]` that the URL belongs to the safe class.
    fn predict_safe_probability(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}
