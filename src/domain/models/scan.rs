//! Multi-vendor scan report types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier handed back by the scan service on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Progress of a remote analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisStatus {
    Queued,
    InProgress,
    Completed,
}

impl AnalysisStatus {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// What a single detection engine concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineVerdict {
    pub category: String,
    #[serde(default)]
    pub result: Option<String>,
}

impl EngineVerdict {
    pub fn is_malicious(&self) -> bool {
        self.category == "malicious"
    }
}

/// One poll answer: status plus per-engine results once completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub status: AnalysisStatus,
    #[serde(default)]
    pub results: HashMap<String, EngineVerdict>,
}
