//! Normalized signal results shared by every source.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The independent signal producers consulted for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Browsing-safety blocklist lookup (Safe Browsing)
    ReputationList,
    /// Asynchronous multi-engine scan (VirusTotal)
    MultiVendor,
    /// Local lexical/host feature classifier
    Classifier,
}

impl SignalSource {
    pub const ALL: [Self; 3] = [Self::ReputationList, Self::MultiVendor, Self::Classifier];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReputationList => "reputation_list",
            Self::MultiVendor => "multi_vendor",
            Self::Classifier => "classifier",
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state outcome of one signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Safe,
    Unsafe,
    /// Unreachable, misconfigured or inconclusive
    Unknown,
}

impl SignalStatus {
    /// Numeric vote: SAFE is 1, UNSAFE is 0, UNKNOWN casts no vote.
    pub const fn vote(self) -> Option<f64> {
        match self {
            Self::Safe => Some(1.0),
            Self::Unsafe => Some(0.0),
            Self::Unknown => None,
        }
    }

    pub const fn is_conclusive(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Unsafe => "unsafe",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized output of one adapter.
///
/// Constructed only through [`SignalResult::safe`], [`SignalResult::malicious`]
/// and [`SignalResult::unknown`], which keep the invariant that an UNKNOWN
/// result carries an error and no raw score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalResult {
    source: SignalSource,
    status: SignalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SignalResult {
    pub const fn safe(source: SignalSource) -> Self {
        Self {
            source,
            status: SignalStatus::Safe,
            raw_score: None,
            error: None,
        }
    }

    pub const fn malicious(source: SignalSource) -> Self {
        Self {
            source,
            status: SignalStatus::Unsafe,
            raw_score: None,
            error: None,
        }
    }

    pub fn unknown(source: SignalSource, error: impl fmt::Display) -> Self {
        Self {
            source,
            status: SignalStatus::Unknown,
            raw_score: None,
            error: Some(error.to_string()),
        }
    }

    /// Attach a numeric detail (vendor count, probability). Ignored for UNKNOWN.
    #[must_use]
    pub fn with_raw_score(mut self, score: f64) -> Self {
        if self.status.is_conclusive() {
            self.raw_score = Some(score);
        }
        self
    }

    pub const fn source(&self) -> SignalSource {
        self.source
    }

    pub const fn status(&self) -> SignalStatus {
        self.status
    }

    pub const fn raw_score(&self) -> Option<f64> {
        self.raw_score
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Rejected insertion into a [`PartialResultSet`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Result for {0} already recorded")]
pub struct DuplicateSource(pub SignalSource);

/// Per-request collection holding exactly one result per configured source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PartialResultSet {
    results: BTreeMap<SignalSource, SignalResult>,
}

impl PartialResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a result; a second result for the same source is refused.
    pub fn insert(&mut self, result: SignalResult) -> Result<(), DuplicateSource> {
        let source = result.source();
        if self.results.contains_key(&source) {
            return Err(DuplicateSource(source));
        }
        self.results.insert(source, result);
        Ok(())
    }

    pub fn get(&self, source: SignalSource) -> Option<&SignalResult> {
        self.results.get(&source)
    }

    /// Status of a source, treating a missing entry as UNKNOWN.
    pub fn status_of(&self, source: SignalSource) -> SignalStatus {
        self.get(source)
            .map_or(SignalStatus::Unknown, SignalResult::status)
    }

    pub fn contains(&self, source: SignalSource) -> bool {
        self.results.contains_key(&source)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalResult> {
        self.results.values()
    }
}

impl FromIterator<SignalResult> for PartialResultSet {
    /// Later duplicates are dropped; the first result per source wins.
    fn from_iter<I: IntoIterator<Item = SignalResult>>(iter: I) -> Self {
        let mut set = Self::new();
        for result in iter {
            let _ = set.insert(result);
        }
        set
    }
}
