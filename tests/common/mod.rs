//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use safelink::domain::models::{Config, RetryConfig, SignalResult, SignalSource, SignalStatus};
use safelink::SignalAdapter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Retry settings that keep wiremock tests fast.
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
    }
}

/// Configuration that never reaches the network: no keys, no host probes,
/// verdict log inside `dir`.
pub fn offline_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.classifier.host_probes = false;
    config.verdict_log.path = dir.path().join("verdicts.jsonl");
    config
}

/// Adapter answering a fixed status after an optional delay.
pub struct StubAdapter {
    source: SignalSource,
    status: SignalStatus,
    delay: Duration,
    calls: AtomicUsize,
}

impl StubAdapter {
    pub fn new(source: SignalSource, status: SignalStatus) -> Arc<Self> {
        Self::delayed(source, status, Duration::ZERO)
    }

    pub fn delayed(source: SignalSource, status: SignalStatus, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            source,
            status,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalAdapter for StubAdapter {
    fn source(&self) -> SignalSource {
        self.source
    }

    async fn check(&self, _url: &str) -> SignalResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.status {
            SignalStatus::Safe => SignalResult::safe(self.source),
            SignalStatus::Unsafe => SignalResult::malicious(self.source),
            SignalStatus::Unknown => SignalResult::unknown(self.source, "stubbed unavailable"),
        }
    }
}
