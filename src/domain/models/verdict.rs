use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::signal::PartialResultSet;

/// Binary outcome of a URL check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Safe,
    Unsafe,
}

impl FinalStatus {
    pub const fn is_safe(self) -> bool {
        matches!(self, Self::Safe)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Unsafe => "unsafe",
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which branch of the voting policy produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPath {
    /// Weighted sum over all three sources
    Weighted,
    /// Reputation list unavailable; classifier vote taken as-is
    ClassifierFallback,
}

/// Final, immutable result of one check request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    final_status: FinalStatus,
    per_source: PartialResultSet,
    decision_path: DecisionPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    weighted_score: Option<f64>,
    decided_at: DateTime<Utc>,
}

impl Verdict {
    pub(crate) fn new(
        final_status: FinalStatus,
        per_source: PartialResultSet,
        decision_path: DecisionPath,
        weighted_score: Option<f64>,
    ) -> Self {
        Self {
            final_status,
            per_source,
            decision_path,
            weighted_score,
            decided_at: Utc::now(),
        }
    }

    pub const fn final_status(&self) -> FinalStatus {
        self.final_status
    }

    pub const fn per_source(&self) -> &PartialResultSet {
        &self.per_source
    }

    pub const fn decision_path(&self) -> DecisionPath {
        self.decision_path
    }

    pub const fn weighted_score(&self) -> Option<f64> {
        self.weighted_score
    }

    pub const fn decided_at(&self) -> DateTime<Utc> {
        self.decided_at
    }
}
