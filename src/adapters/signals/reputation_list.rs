//! Reputation-list adapter: one blocklist lookup per URL.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::absorb;
use crate::domain::models::{SignalResult, SignalSource};
use crate::domain::ports::{ReputationListClient, SignalAdapter};

const SOURCE: SignalSource = SignalSource::ReputationList;

/// Maps a threat-match lookup onto SAFE / UNSAFE / UNKNOWN.
///
/// The raw score is the number of matched threat categories.
pub struct ReputationListAdapter {
    client: Arc<dyn ReputationListClient>,
}

impl ReputationListAdapter {
    pub fn new(client: Arc<dyn ReputationListClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SignalAdapter for ReputationListAdapter {
    fn source(&self) -> SignalSource {
        SOURCE
    }

    async fn check(&self, url: &str) -> SignalResult {
        match self.client.lookup(url).await {
            Ok(matched) if matched.is_match() => {
                info!(source = %SOURCE, threat_types = ?matched.threat_types, "url is listed");
                SignalResult::malicious(SOURCE).with_raw_score(matched.threat_types.len() as f64)
            }
            Ok(_) => {
                debug!(source = %SOURCE, "url not listed");
                SignalResult::safe(SOURCE).with_raw_score(0.0)
            }
            Err(err) => absorb(SOURCE, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ServiceError;
    use crate::domain::models::SignalStatus;
    use crate::domain::ports::ReputationMatch;

    struct StubClient(Result<ReputationMatch, ServiceError>);

    #[async_trait]
    impl ReputationListClient for StubClient {
        async fn lookup(&self, _url: &str) -> Result<ReputationMatch, ServiceError> {
            self.0.clone()
        }
    }

    async fn check_with(answer: Result<ReputationMatch, ServiceError>) -> SignalResult {
        ReputationListAdapter::new(Arc::new(StubClient(answer)))
            .check("http://example.com")
            .await
    }

    #[tokio::test]
    async fn test_match_is_unsafe() {
        let result = check_with(Ok(ReputationMatch {
            threat_types: vec!["MALWARE".to_string(), "SOCIAL_ENGINEERING".to_string()],
        }))
        .await;
        assert_eq!(result.status(), SignalStatus::Unsafe);
        assert_eq!(result.raw_score(), Some(2.0));
    }

    #[tokio::test]
    async fn test_no_match_is_safe() {
        let result = check_with(Ok(ReputationMatch::default())).await;
        assert_eq!(result.status(), SignalStatus::Safe);
    }

    #[tokio::test]
    async fn test_missing_key_is_unknown() {
        let result = check_with(Err(ServiceError::MissingCredential("safe_browsing"))).await;
        assert_eq!(result.status(), SignalStatus::Unknown);
        assert_eq!(result.error(), Some("Missing credential for safe_browsing"));
        assert_eq!(result.raw_score(), None);
    }
}
