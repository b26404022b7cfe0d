use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{Config, RetryConfig};

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".safelink";

/// Plain variables honoured alongside the `SAFELINK_*` ones.
const LEGACY_ENV: [(&str, &str); 2] = [
    ("APIKEY", "safe_browsing.api_key"),
    ("VT_API_KEY", "virustotal.api_key"),
];

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid weight for {0}: {1}. Must be finite and non-negative")]
    InvalidWeight(&'static str, f64),

    #[error("Invalid threshold: {0}. Must be in (0, 1]")]
    InvalidThreshold(f64),

    #[error("Invalid per_adapter_timeout_ms: must be greater than 0")]
    InvalidTimeout,

    #[error("Invalid malicious_vendor_threshold: must be at least 1")]
    InvalidMaliciousThreshold,

    #[error("Invalid max_poll_attempts: must be at least 1")]
    InvalidPollAttempts,

    #[error("Invalid requests_per_minute: must be at least 1")]
    InvalidRateLimit,

    #[error("Invalid safe_probability_threshold: {0}. Must be in [0, 1]")]
    InvalidProbabilityThreshold(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error(
        "Invalid backoff configuration for {0}: initial_backoff_ms ({1}) must not exceed max_backoff_ms ({2})"
    )]
    InvalidBackoff(&'static str, u64, u64),

    #[error("Invalid server port: must not be 0")]
    InvalidPort,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .safelink/config.yaml
    /// 3. .safelink/local.yaml (optional overrides)
    /// 4. `APIKEY` / `VT_API_KEY`
    /// 5. Environment variables (SAFELINK_* prefix, `__` nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same as [`load`](Self::load) with another configuration directory.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(legacy_env())
            .merge(Env::prefixed("SAFELINK_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, then apply the environment.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(legacy_env())
            .merge(Env::prefixed("SAFELINK_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let check = &config.check;
        for (name, weight) in [
            ("reputation_list", check.weights.reputation_list),
            ("multi_vendor", check.weights.multi_vendor),
            ("classifier", check.weights.classifier),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight(name, weight));
            }
        }

        if !(check.threshold > 0.0 && check.threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(check.threshold));
        }

        if check.per_adapter_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        if check.malicious_vendor_threshold == 0 {
            return Err(ConfigError::InvalidMaliciousThreshold);
        }

        if config.virustotal.max_poll_attempts == 0 {
            return Err(ConfigError::InvalidPollAttempts);
        }

        if config.virustotal.requests_per_minute == 0 {
            return Err(ConfigError::InvalidRateLimit);
        }

        validate_retry("safe_browsing", &config.safe_browsing.retry)?;
        validate_retry("virustotal", &config.virustotal.retry)?;

        let p = config.classifier.safe_probability_threshold;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbabilityThreshold(p));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        Ok(())
    }
}

fn legacy_env() -> Env {
    Env::raw()
        .only(&LEGACY_ENV.map(|(var, _)| var))
        .map(|key| {
            LEGACY_ENV
                .iter()
                .find(|(var, _)| key == *var)
                .map_or_else(|| key.as_str().to_owned().into(), |(_, path)| (*path).into())
        })
}

fn validate_retry(section: &'static str, retry: &RetryConfig) -> Result<(), ConfigError> {
    if retry.initial_backoff_ms > retry.max_backoff_ms {
        return Err(ConfigError::InvalidBackoff(
            section,
            retry.initial_backoff_ms,
            retry.max_backoff_ms,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        ConfigLoader::validate(&Config::default()).expect("Default config should be valid");
    }

    #[test]
    fn test_validate_negative_weight() {
        let mut config = Config::default();
        config.check.weights.multi_vendor = -0.1;

        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidWeight("multi_vendor", -0.1))
        );
    }

    #[test]
    fn test_validate_threshold_bounds() {
        let mut config = Config::default();
        config.check.threshold = 0.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidThreshold(_))
        ));

        config.check.threshold = 1.0;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_values() {
        let mut config = Config::default();
        config.check.per_adapter_timeout_ms = 0;
        assert_eq!(ConfigLoader::validate(&config), Err(ConfigError::InvalidTimeout));

        let mut config = Config::default();
        config.check.malicious_vendor_threshold = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaliciousThreshold)
        );

        let mut config = Config::default();
        config.virustotal.max_poll_attempts = 0;
        assert_eq!(ConfigLoader::validate(&config), Err(ConfigError::InvalidPollAttempts));

        let mut config = Config::default();
        config.server.port = 0;
        assert_eq!(ConfigLoader::validate(&config), Err(ConfigError::InvalidPort));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = Config::default();
        config.virustotal.retry.initial_backoff_ms = 5_000;
        config.virustotal.retry.max_backoff_ms = 1_000;

        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff("virustotal", 5_000, 1_000))
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = TempDir::new().unwrap();
        let mut base = std::fs::File::create(dir.path().join("config.yaml")).unwrap();
        writeln!(base, "check:\n  threshold: 0.5\nlogging:\n  level: info\n  format: json").unwrap();
        let mut local = std::fs::File::create(dir.path().join("local.yaml")).unwrap();
        writeln!(local, "logging:\n  level: debug").unwrap();

        let config = temp_env::with_vars_unset(
            ["SAFELINK_LOGGING__LEVEL", "SAFELINK_CHECK__THRESHOLD", "APIKEY", "VT_API_KEY"],
            || ConfigLoader::load_from_dir(dir.path()).unwrap(),
        );

        assert!((config.check.threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "debug", "Override should win");
        assert_eq!(
            config.logging.format,
            crate::domain::models::LogFormat::Json,
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_env_override() {
        let dir = TempDir::new().unwrap();

        let config = temp_env::with_vars(
            [
                ("SAFELINK_CHECK__PER_ADAPTER_TIMEOUT_MS", Some("1500")),
                ("SAFELINK_SERVER__PORT", Some("8080")),
                ("SAFELINK_VIRUSTOTAL__API_KEY", Some("vt-from-prefixed")),
            ],
            || ConfigLoader::load_from_dir(dir.path()).unwrap(),
        );

        assert_eq!(config.check.per_adapter_timeout_ms, 1500);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.virustotal.api_key.as_deref(), Some("vt-from-prefixed"));
    }

    #[test]
    fn test_legacy_key_variables() {
        let dir = TempDir::new().unwrap();

        let config = temp_env::with_vars(
            [
                ("APIKEY", Some("sb-legacy")),
                ("VT_API_KEY", Some("vt-legacy")),
                ("SAFELINK_VIRUSTOTAL__API_KEY", None),
                ("SAFELINK_SAFE_BROWSING__API_KEY", None),
            ],
            || ConfigLoader::load_from_dir(dir.path()).unwrap(),
        );

        assert_eq!(config.safe_browsing.api_key.as_deref(), Some("sb-legacy"));
        assert_eq!(config.virustotal.api_key.as_deref(), Some("vt-legacy"));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "check:\n  threshold: 2.0\n").unwrap();

        let err = ConfigLoader::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid threshold"));
    }
}
