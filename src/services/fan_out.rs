//! Concurrent fan-out over signal adapters.
//!
//! Each adapter runs in its own tokio task and hands its result back through
//! that task's `JoinHandle`, so no slot is ever written by two producers. The
//! executor waits for every adapter to finish or hit the per-adapter ceiling.
//! A task that hits the ceiling is recorded as UNKNOWN and left running
//! detached; whatever it eventually returns is only logged.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::error::{SignalError, TimeoutError};
use crate::domain::models::{PartialResultSet, SignalResult, SignalSource};
use crate::domain::ports::SignalAdapter;

/// Run every adapter concurrently and collect one result per adapter.
///
/// Adapter sources are expected to be unique; a second adapter reporting an
/// already-collected source is dropped with a warning.
pub async fn run_checks(
    url: &str,
    adapters: &[Arc<dyn SignalAdapter>],
    per_adapter_timeout: Duration,
) -> PartialResultSet {
    let started = Instant::now();
    let url: Arc<str> = Arc::from(url);

    let pending = adapters.iter().map(|adapter| {
        let source = adapter.source();
        let adapter = Arc::clone(adapter);
        let url = Arc::clone(&url);
        let handle = tokio::spawn(async move { adapter.check(&url).await });
        collect(source, handle, per_adapter_timeout)
    });

    let mut partial = PartialResultSet::new();
    for result in join_all(pending).await {
        if let Err(err) = partial.insert(result) {
            warn!(error = %err, "dropping result from duplicate adapter");
        }
    }

    debug!(
        adapters = adapters.len(),
        collected = partial.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fan-out complete"
    );
    partial
}

async fn collect(
    source: SignalSource,
    mut handle: JoinHandle<SignalResult>,
    timeout: Duration,
) -> SignalResult {
    let started = Instant::now();

    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(result)) if result.source() == source => {
            debug!(
                source = %source,
                status = %result.status(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "adapter answered"
            );
            result
        }
        Ok(Ok(result)) => {
            warn!(
                source = %source,
                reported = %result.source(),
                "adapter reported a foreign source"
            );
            SignalResult::unknown(
                source,
                SignalError::Aborted(format!("adapter reported {}", result.source())),
            )
        }
        Ok(Err(join_err)) => {
            warn!(source = %source, error = %join_err, "adapter task aborted");
            SignalResult::unknown(source, SignalError::Aborted(join_err.to_string()))
        }
        Err(_) => {
            let err = SignalError::from(TimeoutError {
                signal: source,
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
            warn!(source = %source, kind = err.kind(), error = %err, "adapter timed out");
            tokio::spawn(log_late_result(source, handle, started));
            SignalResult::unknown(source, err)
        }
    }
}

/// Observe an abandoned adapter; its answer no longer affects any verdict.
async fn log_late_result(source: SignalSource, handle: JoinHandle<SignalResult>, started: Instant) {
    match handle.await {
        Ok(result) => info!(
            source = %source,
            status = %result.status(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "late adapter result discarded"
        ),
        Err(err) => debug!(source = %source, error = %err, "abandoned adapter task ended"),
    }
}
