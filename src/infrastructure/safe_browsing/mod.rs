//! Google Safe Browsing v4 threat-match client.

pub mod client;
pub mod types;

pub use client::SafeBrowsingClient;
pub use types::{FindThreatMatchesRequest, FindThreatMatchesResponse, ThreatMatch};
