//! Classifier adapter: feature extraction followed by model scoring.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::absorb;
use crate::domain::error::{ModelError, SignalError};
use crate::domain::models::{SignalResult, SignalSource};
use crate::domain::ports::{ClassifierModel, FeatureExtractor, SignalAdapter};

const SOURCE: SignalSource = SignalSource::Classifier;

/// Default probability-of-safe below which a URL is UNSAFE.
pub const DEFAULT_SAFE_PROBABILITY_THRESHOLD: f64 = 0.70;

/// Scores a URL with the local model.
///
/// A model that failed to load is kept as its error, so every check
/// reports UNKNOWN instead of the process refusing to start. The raw score
/// is the probability that the URL is malicious.
pub struct ClassifierAdapter {
    extractor: Arc<dyn FeatureExtractor>,
    model: Result<Arc<dyn ClassifierModel>, ModelError>,
    safe_probability_threshold: f64,
}

impl ClassifierAdapter {
    pub fn new(
        extractor: Arc<dyn FeatureExtractor>,
        model: Arc<dyn ClassifierModel>,
        safe_probability_threshold: f64,
    ) -> Self {
        Self {
            extractor,
            model: Ok(model),
            safe_probability_threshold,
        }
    }

    /// An adapter whose model could not be loaded.
    pub fn without_model(
        extractor: Arc<dyn FeatureExtractor>,
        error: ModelError,
        safe_probability_threshold: f64,
    ) -> Self {
        Self {
            extractor,
            model: Err(error),
            safe_probability_threshold,
        }
    }

    async fn score(&self, url: &str) -> Result<f64, SignalError> {
        let model = self.model.as_ref().map_err(Clone::clone)?;
        let features = self.extractor.extract(url).await?;
        debug!(source = %SOURCE, features = features.len(), "features extracted");

        let p_safe = model.predict_safe_probability(&features)?;
        if !p_safe.is_finite() || !(0.0..=1.0).contains(&p_safe) {
            return Err(ModelError::InvalidProbability(p_safe.to_string()).into());
        }
        Ok(p_safe)
    }
}

#[async_trait]
impl SignalAdapter for ClassifierAdapter {
    fn source(&self) -> SignalSource {
        SOURCE
    }

    async fn check(&self, url: &str) -> SignalResult {
        match self.score(url).await {
            Ok(p_safe) => {
                let p_malicious = 1.0 - p_safe;
                info!(source = %SOURCE, p_safe = p_safe, "url scored");
                if p_safe < self.safe_probability_threshold {
                    SignalResult::malicious(SOURCE).with_raw_score(p_malicious)
                } else {
                    SignalResult::safe(SOURCE).with_raw_score(p_malicious)
                }
            }
            Err(err) => absorb(SOURCE, err),
        }
    }
}
