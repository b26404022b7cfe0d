//! Best-effort host probes: registration age, DNS, TLS and popularity.
//!
//! Every probe has a default value that stands when the probe fails or
//! runs out of time.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::models::FeatureVector;

/// Popular registrable domains loaded from a `rank,domain` CSV.
#[derive(Debug, Clone, Default)]
pub struct TopSites {
    domains: HashSet<String>,
}

impl TopSites {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read top sites list {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Lines without a second column are skipped.
    pub fn parse(content: &str) -> Self {
        let domains = content
            .lines()
            .filter_map(|line| line.trim().split(',').nth(1))
            .map(|domain| domain.trim().to_ascii_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        Self { domains }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RdapDomain {
    #[serde(default)]
    events: Vec<RdapEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RdapEvent {
    event_action: String,
    event_date: DateTime<Utc>,
}

/// Runs the network probes for one registrable domain.
pub struct HostProber {
    http_client: ReqwestClient,
    rdap_base_url: String,
    probe_timeout: Duration,
}

impl HostProber {
    pub fn new(rdap_base_url: &str, probe_timeout: Duration) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(probe_timeout)
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()
            .context("Failed to build host probe HTTP client")?;

        Ok(Self {
            http_client,
            rdap_base_url: rdap_base_url.trim_end_matches('/').to_string(),
            probe_timeout,
        })
    }

    /// Run the three network probes concurrently.
    pub async fn probe(&self, domain: &str) -> FeatureVector {
        let (age, dns, tls) = tokio::join!(
            self.bounded("rdap", domain_age_days(&self.http_client, &self.rdap_base_url, domain)),
            self.bounded("dns", dns_record_exists(domain)),
            self.bounded("tls", has_ssl_certificate(&self.http_client, domain)),
        );

        let mut features = FeatureVector::new();
        features.insert("domain_age_days", age.unwrap_or(-1.0));
        features.insert_flag("dns_record_exists", dns.unwrap_or(false));
        features.insert_flag("has_ssl_certificate", tls.unwrap_or(false));
        features
    }

    async fn bounded<T>(
        &self,
        probe: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.probe_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                debug!(probe = probe, error = %err, "host probe failed");
                None
            }
            Err(_) => {
                debug!(probe = probe, timeout_ms = self.probe_timeout.as_millis() as u64, "host probe timed out");
                None
            }
        }
    }
}

/// Days since the domain's RDAP `registration` event.
async fn domain_age_days(client: &ReqwestClient, rdap_base_url: &str, domain: &str) -> Result<f64> {
    let record: RdapDomain = client
        .get(format!("{rdap_base_url}/domain/{domain}"))
        .header(reqwest::header::ACCEPT, "application/rdap+json")
        .send()
        .await
        .context("RDAP request failed")?
        .error_for_status()
        .context("RDAP lookup rejected")?
        .json()
        .await
        .context("Malformed RDAP response")?;

    let registered = record
        .events
        .iter()
        .find(|event| event.event_action.eq_ignore_ascii_case("registration"))
        .map(|event| event.event_date)
        .context("RDAP record has no registration event")?;

    Ok((Utc::now() - registered).num_days() as f64)
}

async fn dns_record_exists(domain: &str) -> Result<bool> {
    let mut addrs = tokio::net::lookup_host((domain, 443))
        .await
        .with_context(|| format!("DNS lookup for {domain} failed"))?;
    Ok(addrs.next().is_some())
}

/// A completed HTTPS exchange implies the certificate validated.
async fn has_ssl_certificate(client: &ReqwestClient, domain: &str) -> Result<bool> {
    client
        .head(format!("https://{domain}/"))
        .send()
        .await
        .context("TLS handshake failed")?;
    Ok(true)
}

/// Log once when no top-sites list is available.
pub fn load_top_sites(path: Option<&Path>) -> TopSites {
    let Some(path) = path else {
        return TopSites::default();
    };
    match TopSites::load(path) {
        Ok(sites) => {
            debug!(path = %path.display(), domains = sites.len(), "top sites loaded");
            sites
        }
        Err(err) => {
            warn!(error = %err, "top sites unavailable, is_alexa_top will read 0");
            TopSites::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_top_sites_parse() {
        let sites = TopSites::parse("1,google.com\n2,Example.org\nbroken-line\n3,\n");
        assert_eq!(sites.len(), 2);
        assert!(sites.contains("google.com"));
        assert!(sites.contains("example.org"));
        assert!(!sites.contains("broken-line"));
    }

    #[test]
    fn test_top_sites_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1,wikipedia.org").unwrap();

        let sites = load_top_sites(Some(file.path()));
        assert!(sites.contains("wikipedia.org"));
        assert!(load_top_sites(Some(Path::new("/nonexistent/top-1m.csv"))).is_empty());
    }

    #[tokio::test]
    async fn test_domain_age_from_rdap() {
        let server = MockServer::start().await;
        let registered = (Utc::now() - chrono::Duration::days(400)).to_rfc3339();
        Mock::given(method("GET"))
            .and(path("/domain/example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "objectClassName": "domain",
                "events": [
                    {"eventAction": "last changed", "eventDate": "2024-01-01T00:00:00Z"},
                    {"eventAction": "registration", "eventDate": registered}
                ]
            })))
            .mount(&server)
            .await;

        let client = ReqwestClient::new();
        let age = domain_age_days(&client, &server.uri(), "example.com").await.unwrap();
        assert!((399.0..=400.0).contains(&age), "age {age}");
    }

    #[tokio::test]
    async fn test_failed_probes_keep_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let prober = HostProber::new(&server.uri(), Duration::from_millis(500)).unwrap();
        let features = prober.probe("no-such-host.invalid").await;

        assert_eq!(features.get("domain_age_days"), Some(-1.0));
        assert_eq!(features.get("dns_record_exists"), Some(0.0));
        assert_eq!(features.get("has_ssl_certificate"), Some(0.0));
    }
}
