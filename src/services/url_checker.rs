//! URL check service: validation, fan-out and aggregation.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::aggregator::VerdictAggregator;
use super::fan_out::run_checks;
use crate::domain::error::ValidationError;
use crate::domain::models::{CheckConfig, DuplicateSource, SignalSource, Verdict};
use crate::domain::ports::{SignalAdapter, VerdictSink};

/// Entry point of the aggregation core.
///
/// Holds the configured adapters and policy; every call to
/// [`check_url`](Self::check_url) owns its own partial result set, so one
/// checker can serve concurrent requests.
pub struct UrlChecker {
    adapters: Vec<Arc<dyn SignalAdapter>>,
    aggregator: VerdictAggregator,
    per_adapter_timeout: Duration,
    sink: Option<Arc<dyn VerdictSink>>,
}

impl UrlChecker {
    /// Build a checker; each adapter must report a distinct source.
    pub fn new(
        adapters: Vec<Arc<dyn SignalAdapter>>,
        config: &CheckConfig,
    ) -> Result<Self, DuplicateSource> {
        let mut seen = BTreeSet::new();
        for adapter in &adapters {
            if !seen.insert(adapter.source()) {
                return Err(DuplicateSource(adapter.source()));
            }
        }

        Ok(Self {
            adapters,
            aggregator: VerdictAggregator::from_config(config),
            per_adapter_timeout: config.per_adapter_timeout(),
            sink: None,
        })
    }

    /// Hand every verdict to `sink` after it is decided.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn VerdictSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sources of the configured adapters, in registration order.
    pub fn sources(&self) -> Vec<SignalSource> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    /// Evaluate a URL against every configured source.
    ///
    /// Only an empty or whitespace-only URL fails, and it fails before any
    /// adapter is invoked. Adapter failures and timeouts degrade the
    /// affected source to UNKNOWN and still produce a verdict.
    #[instrument(skip(self), fields(check_id = %Uuid::new_v4()))]
    pub async fn check_url(&self, url: &str) -> Result<Verdict, ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }

        let started = Instant::now();
        let partial = run_checks(url, &self.adapters, self.per_adapter_timeout).await;
        let verdict = self.aggregator.decide(partial);

        info!(
            final_status = %verdict.final_status(),
            decision_path = ?verdict.decision_path(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "url checked"
        );

        if let Some(sink) = &self.sink {
            if let Err(err) = sink.record(url, &verdict).await {
                warn!(error = %err, "failed to record verdict");
            }
        }

        Ok(verdict)
    }

    /// Wait for recorded verdicts to reach the sink's storage.
    pub async fn flush(&self) {
        if let Some(sink) = &self.sink {
            if let Err(err) = sink.flush().await {
                warn!(error = %err, "failed to flush verdict sink");
            }
        }
    }
}
