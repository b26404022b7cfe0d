//! Signal adapter implementations.

pub mod classifier;
pub mod multi_vendor;
pub mod reputation_list;

pub use classifier::ClassifierAdapter;
pub use multi_vendor::{MultiVendorAdapter, ScanSettings};
pub use reputation_list::ReputationListAdapter;

use tracing::warn;

use crate::domain::error::SignalError;
use crate::domain::models::{SignalResult, SignalSource};

/// Log an absorbed failure with its source and turn it into UNKNOWN.
pub(crate) fn absorb(source: SignalSource, err: impl Into<SignalError>) -> SignalResult {
    let err = err.into();
    warn!(source = %source, kind = err.kind(), error = %err, "signal degraded to unknown");
    SignalResult::unknown(source, err)
}
