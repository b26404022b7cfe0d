//! Verdict sink port - where finished verdicts are recorded.

use async_trait::async_trait;

use crate::domain::models::Verdict;

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// `record` runs on the request path and must only hand the verdict off;
/// durable writes happen later and are awaited through `flush`.
#[async_trait]
pub trait VerdictSink: Send + Sync {
    async fn record(&self, url: &str, verdict: &Verdict) -> Result<()>;

    /// Wait until every verdict recorded so far has been written.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
