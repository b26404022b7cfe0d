//! Multi-vendor scan port.

use async_trait::async_trait;

use crate::domain::error::ServiceError;
use crate::domain::models::{AnalysisReport, SubmissionId};

/// Asynchronous scan service aggregating many detection engines.
///
/// A submission returns immediately; the report is fetched by polling.
#[async_trait]
pub trait MultiVendorClient: Send + Sync {
    /// Queue a URL for analysis.
    async fn submit(&self, url: &str) -> Result<SubmissionId, ServiceError>;

    /// Fetch the current state of an analysis.
    ///
    /// Any non-success HTTP answer is returned as an error.
    async fn poll(&self, submission: &SubmissionId) -> Result<AnalysisReport, ServiceError>;
}
