use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{header, Client as ReqwestClient};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::types::{AnalysisResponse, SubmissionResponse};
use crate::domain::error::ServiceError;
use crate::domain::models::{AnalysisReport, SubmissionId, VirusTotalConfig};
use crate::domain::ports::MultiVendorClient;
use crate::infrastructure::http::{error_for_status, from_reqwest, RetryPolicy};

const API_KEY_HEADER: &str = "x-apikey";

/// HTTP client for VirusTotal URL analyses.
///
/// Submissions are gated by a client-side quota and retried on transient
/// errors. An exhausted quota fails the submission at once instead of
/// queueing it, so one busy minute never delays later checks. Polls are
/// single requests; the adapter's poll loop decides what happens next.
pub struct VirusTotalClient {
    http_client: ReqwestClient,
    api_key: Option<String>,
    base_url: String,
    rate_limiter: DefaultDirectRateLimiter,
    retry_policy: RetryPolicy,
}

impl VirusTotalClient {
    pub fn new(config: &VirusTotalConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .context("Failed to build VirusTotal HTTP client")?;

        let per_minute = NonZeroU32::new(config.requests_per_minute)
            .context("virustotal.requests_per_minute must be greater than 0")?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone().filter(|key| !key.is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
            retry_policy: RetryPolicy::from_config(&config.retry),
        })
    }

    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ServiceError> {
        self.api_key
            .as_deref()
            .ok_or(ServiceError::MissingCredential("virustotal"))
    }

    async fn send_submission(&self, api_key: &str, url: &str) -> Result<SubmissionId, ServiceError> {
        let response = self
            .http_client
            .post(format!("{}/api/v3/urls", self.base_url))
            .header(API_KEY_HEADER, api_key)
            .header(header::ACCEPT, "application/json")
            .form(&[("url", url)])
            .send()
            .await
            .map_err(|e| from_reqwest(&e))?;

        let submission: SubmissionResponse = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        Ok(SubmissionId::new(submission.data.id))
    }
}

#[async_trait]
impl MultiVendorClient for VirusTotalClient {
    #[instrument(skip(self, url))]
    async fn submit(&self, url: &str) -> Result<SubmissionId, ServiceError> {
        let api_key = self.api_key()?;
        if self.rate_limiter.check().is_err() {
            warn!("virustotal submission quota exhausted");
            return Err(ServiceError::RateLimitExceeded);
        }

        let id = self
            .retry_policy
            .execute(|| self.send_submission(api_key, url))
            .await?;
        debug!(submission_id = %id, "analysis queued");
        Ok(id)
    }

    #[instrument(skip(self), fields(submission_id = %submission))]
    async fn poll(&self, submission: &SubmissionId) -> Result<AnalysisReport, ServiceError> {
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .get(format!("{}/api/v3/analyses/{}", self.base_url, submission))
            .header(API_KEY_HEADER, api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| from_reqwest(&e))?;

        let analysis: AnalysisResponse = error_for_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

        debug!(status = ?analysis.data.attributes.status, "analysis polled");
        Ok(analysis.data.attributes)
    }
}
