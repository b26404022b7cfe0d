//! Domain layer for Safelink
//!
//! This module contains the signal and verdict models, the typed error
//! taxonomy, and the port traits external collaborators implement.

pub mod error;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use error::{
    ExtractionError, ModelError, ScanError, ServiceError, SignalError, TimeoutError,
    ValidationError,
};
