//! Wiring of the configured adapters into a [`UrlChecker`].
//!
//! Missing credentials and an unloadable model do not stop startup: the
//! affected source reports UNKNOWN on every check instead.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use super::features::UrlFeatureExtractor;
use super::logging::VerdictLog;
use super::model::ForestModel;
use super::safe_browsing::SafeBrowsingClient;
use super::virustotal::VirusTotalClient;
use crate::adapters::signals::{
    ClassifierAdapter, MultiVendorAdapter, ReputationListAdapter, ScanSettings,
};
use crate::domain::error::ModelError;
use crate::domain::models::{ClassifierConfig, Config};
use crate::domain::ports::{ClassifierModel, SignalAdapter};
use crate::services::UrlChecker;

/// Which remote services have credentials configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Credentials {
    pub safe_browsing: bool,
    pub virustotal: bool,
}

impl Credentials {
    pub fn from_config(config: &Config) -> Self {
        let present = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.is_empty());
        Self {
            safe_browsing: present(&config.safe_browsing.api_key),
            virustotal: present(&config.virustotal.api_key),
        }
    }
}

/// Build the three adapters described by `config`.
pub fn build_adapters(config: &Config) -> Result<Vec<Arc<dyn SignalAdapter>>> {
    let safe_browsing = SafeBrowsingClient::new(&config.safe_browsing)?;
    let virustotal = VirusTotalClient::new(&config.virustotal)?;

    if !safe_browsing.has_credential() {
        warn!("no Safe Browsing API key configured, reputation list will report unknown");
    }
    if !virustotal.has_credential() {
        warn!("no VirusTotal API key configured, multi-vendor scan will report unknown");
    }

    Ok(vec![
        Arc::new(ReputationListAdapter::new(Arc::new(safe_browsing))),
        Arc::new(MultiVendorAdapter::new(
            Arc::new(virustotal),
            ScanSettings::from_config(&config.check, &config.virustotal),
        )),
        Arc::new(build_classifier(&config.classifier)?),
    ])
}

fn build_classifier(config: &ClassifierConfig) -> Result<ClassifierAdapter> {
    let extractor = Arc::new(UrlFeatureExtractor::from_config(config)?);
    let threshold = config.safe_probability_threshold;

    let model = config
        .model_path
        .as_deref()
        .ok_or_else(|| ModelError::NotLoaded("no classifier.model_path configured".to_string()))
        .and_then(ForestModel::from_path);

    Ok(match model {
        Ok(model) => {
            info!(trees = model.tree_count(), features = model.features().len(), "classifier model loaded");
            let model: Arc<dyn ClassifierModel> = Arc::new(model);
            ClassifierAdapter::new(extractor, model, threshold)
        }
        Err(err) => {
            warn!(error = %err, "classifier unavailable, it will report unknown");
            ClassifierAdapter::without_model(extractor, err, threshold)
        }
    })
}

/// Build a checker with every adapter and, when enabled, the verdict log.
pub async fn build_checker(config: &Config) -> Result<UrlChecker> {
    let checker = UrlChecker::new(build_adapters(config)?, &config.check)
        .context("Adapters must report distinct sources")?;

    if !config.verdict_log.enabled {
        return Ok(checker);
    }

    let log = VerdictLog::new(&config.verdict_log.path).await?;
    Ok(checker.with_sink(Arc::new(log)))
}
