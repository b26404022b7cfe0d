//! Safelink - URL safety checker
//!
//! Safelink decides whether a URL is safe by asking three independent
//! signal sources concurrently and combining their answers with a weighted
//! vote: a reputation list (Google Safe Browsing), a multi-vendor scan
//! (VirusTotal) and a local classifier over lexical and host features.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): signal and verdict models, errors, ports
//! - **Service Layer** (`services`): fan-out, aggregation and the check entry point
//! - **Adapters** (`adapters`): the three signal sources and the HTTP front end
//! - **Infrastructure Layer** (`infrastructure`): remote clients, feature
//!   extraction, model loading, configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use safelink::{ConfigLoader, infrastructure::setup::build_checker};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let checker = build_checker(&config).await?;
//!     let verdict = checker.check_url("https://example.com").await?;
//!     println!("{}", verdict.final_status());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    CheckConfig, Config, FinalStatus, PartialResultSet, SignalResult, SignalSource,
    SignalStatus, Verdict,
};
pub use domain::ports::SignalAdapter;
pub use domain::ValidationError;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{UrlChecker, VerdictAggregator};
