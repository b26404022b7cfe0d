use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Safelink
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Aggregation and fan-out policy
    #[serde(default)]
    pub check: CheckConfig,

    /// Safe Browsing reputation-list service
    #[serde(default)]
    pub safe_browsing: SafeBrowsingConfig,

    /// VirusTotal multi-vendor scan service
    #[serde(default)]
    pub virustotal: VirusTotalConfig,

    /// Local classifier and feature extraction
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP front end
    #[serde(default)]
    pub server: ServerConfig,

    /// Append-only verdict log
    #[serde(default)]
    pub verdict_log: VerdictLogConfig,
}

/// Policy applied by the fan-out executor and the verdict aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckConfig {
    /// Per-source voting weights
    #[serde(default)]
    pub weights: WeightsConfig,

    /// Weighted score at or above which a URL is SAFE
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Ceiling on each adapter's running time
    #[serde(default = "default_per_adapter_timeout_ms")]
    pub per_adapter_timeout_ms: u64,

    /// Detection engines whose opinion counts in a multi-vendor report
    #[serde(default = "default_trusted_vendors")]
    pub trusted_vendors: BTreeSet<String>,

    /// Number of trusted malicious flags that makes a report UNSAFE
    #[serde(default = "default_malicious_vendor_threshold")]
    pub malicious_vendor_threshold: u32,
}

const fn default_threshold() -> f64 {
    0.66
}

const fn default_per_adapter_timeout_ms() -> u64 {
    30_000
}

const fn default_malicious_vendor_threshold() -> u32 {
    5
}

/// Vendors whose multi-vendor verdicts are trusted by default.
pub const DEFAULT_TRUSTED_VENDORS: [&str; 15] = [
    "Google Safebrowsing",
    "Kaspersky",
    "ESET",
    "BitDefender",
    "Fortinet",
    "Sophos",
    "Dr.Web",
    "Webroot",
    "Mimecast",
    "Quick Heal",
    "OpenPhish",
    "Phishtank",
    "URLhaus",
    "Abusix",
    "ZeroFox",
];

fn default_trusted_vendors() -> BTreeSet<String> {
    DEFAULT_TRUSTED_VENDORS.iter().map(ToString::to_string).collect()
}

impl CheckConfig {
    pub const fn per_adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.per_adapter_timeout_ms)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            threshold: default_threshold(),
            per_adapter_timeout_ms: default_per_adapter_timeout_ms(),
            trusted_vendors: default_trusted_vendors(),
            malicious_vendor_threshold: default_malicious_vendor_threshold(),
        }
    }
}

/// Voting weight of each source in the weighted path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WeightsConfig {
    #[serde(default = "default_weight")]
    pub reputation_list: f64,
    #[serde(default = "default_weight")]
    pub multi_vendor: f64,
    #[serde(default = "default_weight")]
    pub classifier: f64,
}

const fn default_weight() -> f64 {
    1.0 / 3.0
}

impl WeightsConfig {
    pub const fn as_array(&self) -> [f64; 3] {
        [self.reputation_list, self.multi_vendor, self.classifier]
    }
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            reputation_list: default_weight(),
            multi_vendor: default_weight(),
            classifier: default_weight(),
        }
    }
}

/// HTTP retry configuration for transient service errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_initial_backoff_ms() -> u64 {
    250
}

const fn default_max_backoff_ms() -> u64 {
    2_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Safe Browsing v4 lookup settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SafeBrowsingConfig {
    /// API key; the adapter reports UNKNOWN when absent
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_safe_browsing_url")]
    pub base_url: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_client_version")]
    pub client_version: String,

    /// Threat lists to match against
    #[serde(default = "default_threat_types")]
    pub threat_types: Vec<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_safe_browsing_url() -> String {
    "https://safebrowsing.googleapis.com".to_string()
}

fn default_client_id() -> String {
    "safelink".to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_threat_types() -> Vec<String> {
    ["MALWARE", "SOCIAL_ENGINEERING", "UNWANTED_SOFTWARE"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

const fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for SafeBrowsingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_safe_browsing_url(),
            client_id: default_client_id(),
            client_version: default_client_version(),
            threat_types: default_threat_types(),
            timeout_secs: default_request_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

/// VirusTotal v3 scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VirusTotalConfig {
    /// API key; the adapter reports UNKNOWN when absent
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_virustotal_url")]
    pub base_url: String,

    /// Wait between submission and the first poll
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Wait between polls while the analysis is in progress
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Poll ceiling before the scan counts as timed out
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Client-side request quota (public API allows 4/min)
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    #[serde(default = "default_scan_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_virustotal_url() -> String {
    "https://www.virustotal.com".to_string()
}

const fn default_settle_delay_ms() -> u64 {
    5_000
}

const fn default_poll_interval_ms() -> u64 {
    2_000
}

const fn default_max_poll_attempts() -> u32 {
    10
}

const fn default_requests_per_minute() -> u32 {
    4
}

const fn default_scan_timeout_secs() -> u64 {
    15
}

impl Default for VirusTotalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_virustotal_url(),
            settle_delay_ms: default_settle_delay_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            requests_per_minute: default_requests_per_minute(),
            timeout_secs: default_scan_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

/// Classifier model and feature extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassifierConfig {
    /// JSON forest model; the adapter reports UNKNOWN when missing
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// `rank,domain` CSV of popular sites
    #[serde(default)]
    pub top_sites_path: Option<PathBuf>,

    /// Probability-of-safe below which the URL is UNSAFE
    #[serde(default = "default_safe_probability_threshold")]
    pub safe_probability_threshold: f64,

    /// Run DNS, TLS and registration-date probes
    #[serde(default = "default_true")]
    pub host_probes: bool,

    /// Timeout for each host probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// RDAP bootstrap service used for domain age
    #[serde(default = "default_rdap_url")]
    pub rdap_base_url: String,
}

const fn default_safe_probability_threshold() -> f64 {
    0.70
}

const fn default_true() -> bool {
    true
}

const fn default_probe_timeout_ms() -> u64 {
    3_000
}

fn default_rdap_url() -> String {
    "https://rdap.org".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            top_sites_path: None,
            safe_probability_threshold: default_safe_probability_threshold(),
            host_probes: default_true(),
            probe_timeout_ms: default_probe_timeout_ms(),
            rdap_base_url: default_rdap_url(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Log file rotation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Console output on stderr; stdout is reserved for command output
    #[serde(default = "default_true")]
    pub enable_console: bool,

    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_console: true,
            rotation: RotationPolicy::default(),
        }
    }
}

/// HTTP front end configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: true,
        }
    }
}

/// Verdict log configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VerdictLogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_verdict_log_path")]
    pub path: PathBuf,
}

fn default_verdict_log_path() -> PathBuf {
    PathBuf::from(".safelink/verdicts.jsonl")
}

impl Default for VerdictLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_verdict_log_path(),
        }
    }
}
