use serde::{Deserialize, Serialize};

/// Body of `POST /v4/threatMatches:find`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindThreatMatchesRequest {
    pub client: ClientInfo,
    pub threat_info: ThreatInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub client_id: String,
    pub client_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatInfo {
    pub threat_types: Vec<String>,
    pub platform_types: Vec<String>,
    pub threat_entry_types: Vec<String>,
    pub threat_entries: Vec<ThreatEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatEntry {
    pub url: String,
}

impl FindThreatMatchesRequest {
    /// Lookup of a single URL on any platform.
    pub fn for_url(
        url: &str,
        client_id: &str,
        client_version: &str,
        threat_types: &[String],
    ) -> Self {
        Self {
            client: ClientInfo {
                client_id: client_id.to_string(),
                client_version: client_version.to_string(),
            },
            threat_info: ThreatInfo {
                threat_types: threat_types.to_vec(),
                platform_types: vec!["ANY_PLATFORM".to_string()],
                threat_entry_types: vec!["URL".to_string()],
                threat_entries: vec![ThreatEntry {
                    url: url.to_string(),
                }],
            },
        }
    }
}

/// Response body; `matches` is absent when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FindThreatMatchesResponse {
    #[serde(default)]
    pub matches: Vec<ThreatMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatMatch {
    pub threat_type: String,
    #[serde(default)]
    pub platform_type: Option<String>,
    #[serde(default)]
    pub threat: Option<ThreatEntry>,
}
