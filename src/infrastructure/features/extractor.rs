use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use super::host::{load_top_sites, HostProber, TopSites};
use super::lexical;
use crate::domain::error::ExtractionError;
use crate::domain::models::{ClassifierConfig, FeatureVector};
use crate::domain::ports::FeatureExtractor;

/// Lexical plus host features in the schema the forest model was trained on.
pub struct UrlFeatureExtractor {
    prober: Option<HostProber>,
    top_sites: TopSites,
}

impl UrlFeatureExtractor {
    pub fn new(prober: Option<HostProber>, top_sites: TopSites) -> Self {
        Self { prober, top_sites }
    }

    /// Build from configuration; a missing top-sites file is not an error.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let prober = if config.host_probes {
            Some(HostProber::new(
                &config.rdap_base_url,
                Duration::from_millis(config.probe_timeout_ms),
            )?)
        } else {
            None
        };
        Ok(Self::new(prober, load_top_sites(config.top_sites_path.as_deref())))
    }

    /// Defaults for the network probes when they are disabled.
    fn unprobed() -> FeatureVector {
        [
            ("domain_age_days", -1.0),
            ("dns_record_exists", 0.0),
            ("has_ssl_certificate", 0.0),
        ]
        .into_iter()
        .collect()
    }
}

#[async_trait]
impl FeatureExtractor for UrlFeatureExtractor {
    #[instrument(skip(self))]
    async fn extract(&self, url: &str) -> Result<FeatureVector, ExtractionError> {
        let parts = lexical::parse(url)?;
        let mut features = lexical::extract(url, &parts);

        let host = match &self.prober {
            Some(prober) => prober.probe(&parts.domain).await,
            None => Self::unprobed(),
        };
        features.extend(host);
        features.insert_flag("is_alexa_top", self.top_sites.contains(&parts.domain));

        debug!(domain = %parts.domain, features = features.len(), "features extracted");
        Ok(features)
    }
}
