//! Reputation-list lookup port.

use async_trait::async_trait;

use crate::domain::error::ServiceError;

/// Answer of a threat-match lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReputationMatch {
    /// Threat categories the URL matched; empty when it is not listed
    pub threat_types: Vec<String>,
}

impl ReputationMatch {
    pub fn is_match(&self) -> bool {
        !self.threat_types.is_empty()
    }
}

/// Point lookup against a maintained blocklist.
#[async_trait]
pub trait ReputationListClient: Send + Sync {
    async fn lookup(&self, url: &str) -> Result<ReputationMatch, ServiceError>;
}
