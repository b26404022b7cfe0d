//! Infrastructure layer module
//!
//! Implementations of the domain ports and process plumbing:
//! - Safe Browsing and VirusTotal HTTP clients
//! - URL feature extraction and the forest model
//! - Configuration management
//! - Logging infrastructure and the verdict log
//! - Wiring of adapters into a checker

pub mod config;
pub mod features;
pub mod http;
pub mod logging;
pub mod model;
pub mod safe_browsing;
pub mod setup;
pub mod virustotal;
