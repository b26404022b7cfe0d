//! VirusTotal v3 URL scan client.

pub mod client;
pub mod types;

pub use client::VirusTotalClient;
pub use types::{AnalysisResponse, SubmissionResponse};
