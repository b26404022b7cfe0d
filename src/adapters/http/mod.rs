//! HTTP front end for URL checks.

pub mod check_http;

pub use check_http::{CheckHttpServer, CheckRequest, CheckResponse};
