//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the aggregation core consumes:
//! - SignalAdapter: a normalized signal source
//! - ReputationListClient: blocklist point lookups
//! - MultiVendorClient: asynchronous multi-engine scans
//! - FeatureExtractor / ClassifierModel: local classification
//! - Sleeper: injectable delay for polling loops
//! - VerdictSink: where finished verdicts are recorded

pub mod classifier;
pub mod multi_vendor;
pub mod reputation_list;
pub mod signal_adapter;
pub mod sleeper;
pub mod verdict_sink;

pub use classifier::{ClassifierModel, FeatureExtractor};
pub use multi_vendor::MultiVendorClient;
pub use reputation_list::{ReputationListClient, ReputationMatch};
pub use signal_adapter::SignalAdapter;
pub use sleeper::{Sleeper, TokioSleeper};
pub use verdict_sink::VerdictSink;
