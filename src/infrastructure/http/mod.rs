//! Shared plumbing for the reputation service clients.

pub mod errors;
pub mod retry;

pub use errors::{error_for_status, from_reqwest};
pub use retry::RetryPolicy;
