//! Signal adapter port - one normalized signal source.

use async_trait::async_trait;

use crate::domain::models::{SignalResult, SignalSource};

/// A signal source wrapped so that it always answers.
///
/// Implementations never return an error: every internal failure is
/// converted into an UNKNOWN [`SignalResult`] carrying the error text.
/// Calls for different URLs share no mutable state.
#[async_trait]
pub trait SignalAdapter: Send + Sync {
    /// The source this adapter reports for.
    fn source(&self) -> SignalSource;

    /// Evaluate a URL.
    async fn check(&self, url: &str) -> SignalResult;
}
