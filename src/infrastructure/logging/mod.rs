//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty console output on stderr, JSON rolling files
//! - Secret scrubbing of formatted output
//! - Append-only verdict log

pub mod logger;
pub mod secret_scrubbing;
pub mod verdict_log;

pub use logger::LoggerImpl;
pub use secret_scrubbing::{ScrubbingMakeWriter, SecretScrubber};
pub use verdict_log::{VerdictLog, VerdictRecord};
