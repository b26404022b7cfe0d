use serde::Deserialize;

use crate::domain::models::AnalysisReport;

/// Answer to `POST /api/v3/urls`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionResponse {
    pub data: SubmissionData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionData {
    /// Analysis identifier, e.g. `u-<sha256>-<timestamp>`
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Answer to `GET /api/v3/analyses/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisResponse {
    pub data: AnalysisData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisData {
    pub id: String,
    pub attributes: AnalysisReport,
}
