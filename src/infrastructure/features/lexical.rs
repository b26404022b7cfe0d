//! Features computed from the URL string alone.

use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

use crate::domain::error::ExtractionError;
use crate::domain::models::FeatureVector;

/// TLDs over-represented in phishing registrations.
pub const SUSPICIOUS_TLDS: [&str; 13] = [
    "zip", "xyz", "tk", "top", "gq", "ga", "ml", "cyou", "buzz", "cf", "icu", "wang", "live",
];

/// Words common in credential-harvesting URLs.
pub const SUSPICIOUS_WORDS: [&str; 10] = [
    "login", "verify", "account", "update", "secure", "bank", "lucky", "bonus", "gift", "signin",
];

/// Second-level labels under which registrations happen one level deeper
/// (`example.co.uk`).
const SHARED_SECOND_LEVEL: [&str; 8] = ["co", "com", "org", "net", "ac", "gov", "edu", "ne"];

static DOTTED_QUAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+\.\d+").expect("valid dotted-quad pattern"));

/// The parts of a URL the host probes need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// Lowercased host as written in the URL
    pub hostname: String,
    /// Registrable domain (`example.co.uk` for `www.example.co.uk`)
    pub domain: String,
    /// Last host label
    pub suffix: String,
}

/// Parse a URL, assuming `http://` when no scheme is given.
pub fn parse(url: &str) -> Result<UrlParts, ExtractionError> {
    let parsed = Url::parse(url)
        .or_else(|err| {
            if url.contains("://") {
                Err(err)
            } else {
                Url::parse(&format!("http://{url}"))
            }
        })
        .map_err(|e| ExtractionError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let hostname = parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ExtractionError::MissingHost(url.to_string()))?
        .to_ascii_lowercase();

    let labels: Vec<&str> = hostname
        .trim_end_matches('.')
        .split('.')
        .filter(|label| !label.is_empty())
        .collect();

    let suffix = labels.last().copied().unwrap_or_default().to_string();
    let domain = registrable_domain(&labels).unwrap_or_else(|| hostname.clone());

    Ok(UrlParts {
        hostname,
        domain,
        suffix,
    })
}

fn registrable_domain(labels: &[&str]) -> Option<String> {
    let n = labels.len();
    if n < 2 {
        return None;
    }
    if labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let take = if n >= 3 && labels[n - 1].len() == 2 && SHARED_SECOND_LEVEL.contains(&labels[n - 2])
    {
        3
    } else {
        2
    };
    Some(labels[n - take..].join("."))
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn count(url: &str, needle: char) -> f64 {
    url.matches(needle).count() as f64
}

/// Compute the sixteen lexical features.
pub fn extract(url: &str, parts: &UrlParts) -> FeatureVector {
    let lower = url.to_lowercase();

    [
        ("url_length", url.chars().count() as f64),
        ("hostname_length", parts.hostname.chars().count() as f64),
        ("num_dots", count(url, '.')),
        ("num_hyphens", count(url, '-')),
        ("has_https", flag(url.starts_with("https"))),
        ("num_subdirs", count(url, '/')),
        ("num_digits", url.chars().filter(char::is_ascii_digit).count() as f64),
        ("num_params", count(url, '=')),
        ("num_fragments", count(url, '#')),
        ("num_uppercase", url.chars().filter(|c| c.is_uppercase()).count() as f64),
        ("has_ip", flag(DOTTED_QUAD.is_match(url))),
        ("has_port", flag(parts.hostname.contains(':'))),
        ("is_encoded", flag(url.contains('%'))),
        ("starts_with_www", flag(parts.hostname.starts_with("www"))),
        (
            "ends_with_suspicious_tld",
            flag(SUSPICIOUS_TLDS.contains(&parts.suffix.as_str())),
        ),
        (
            "suspicious_words",
            flag(SUSPICIOUS_WORDS.iter().any(|w| lower.contains(w))),
        ),
    ]
    .into_iter()
    .collect()
}
