use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, instrument};

use super::types::{FindThreatMatchesRequest, FindThreatMatchesResponse};
use crate::domain::error::ServiceError;
use crate::domain::models::SafeBrowsingConfig;
use crate::domain::ports::{ReputationListClient, ReputationMatch};
use crate::infrastructure::http::{error_for_status, from_reqwest, RetryPolicy};

/// HTTP client for the Safe Browsing Lookup API.
///
/// Without an API key every lookup fails with
/// [`ServiceError::MissingCredential`], which the adapter reports as UNKNOWN.
pub struct SafeBrowsingClient {
    http_client: ReqwestClient,
    api_key: Option<String>,
    endpoint: String,
    client_id: String,
    client_version: String,
    threat_types: Vec<String>,
    retry_policy: RetryPolicy,
}

impl SafeBrowsingClient {
    pub fn new(config: &SafeBrowsingConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .context("Failed to build Safe Browsing HTTP client")?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            endpoint: format!(
                "{}/v4/threatMatches:find",
                config.base_url.trim_end_matches('/')
            ),
            client_id: config.client_id.clone(),
            client_version: config.client_version.clone(),
            threat_types: config.threat_types.clone(),
            retry_policy: RetryPolicy::from_config(&config.retry),
        })
    }

    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_request(
        &self,
        api_key: &str,
        request: &FindThreatMatchesRequest,
    ) -> Result<FindThreatMatchesResponse, ServiceError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await
            .map_err(|e| from_reqwest(&e))?;

        error_for_status(response)
            .await?
            .json::<FindThreatMatchesResponse>()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ReputationListClient for SafeBrowsingClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn lookup(&self, url: &str) -> Result<ReputationMatch, ServiceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredential("safe_browsing"))?;

        let request = FindThreatMatchesRequest::for_url(
            url,
            &self.client_id,
            &self.client_version,
            &self.threat_types,
        );

        let response = self
            .retry_policy
            .execute(|| self.send_request(api_key, &request))
            .await?;

        debug!(matches = response.matches.len(), "threat match lookup answered");
        let mut threat_types: Vec<String> = response
            .matches
            .into_iter()
            .map(|m| m.threat_type)
            .collect();
        threat_types.sort();
        threat_types.dedup();

        Ok(ReputationMatch { threat_types })
    }
}
