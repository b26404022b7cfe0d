use thiserror::Error;

use super::models::SignalSource;

/// Input rejected before any signal source is consulted.
///
/// This is the only error a URL check surfaces to its caller; every other
/// failure degrades a single source to UNKNOWN.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL must not be empty")]
    EmptyUrl,
}

/// Failures talking to a remote reputation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No API key configured for the service
    #[error("Missing credential for {0}")]
    MissingCredential(&'static str),

    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or rejected API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    InvalidApiKey,

    /// Forbidden - permission denied (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error from the remote service (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    /// Any other non-success status
    #[error("Unexpected status ({0}): {1}")]
    UnexpectedStatus(u16, String),

    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// Returns true if this error is transient and should be retried
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::Timeout | Self::Network(_)
        )
    }

    /// Returns true if this is a permanent error that should not be retried
    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Failures turning a URL into a feature vector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Unparseable URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("URL has no host: {0}")]
    MissingHost(String),

    #[error("Feature extraction task failed: {0}")]
    TaskFailed(String),
}

/// Failures loading or evaluating the classifier model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Classifier model not loaded: {0}")]
    NotLoaded(String),

    #[error("Failed to load classifier model: {0}")]
    Load(String),

    #[error("Feature '{0}' required by the model is missing")]
    MissingFeature(String),

    #[error("Malformed tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },

    #[error("Model produced probability {0} outside [0, 1]")]
    InvalidProbability(String),
}

/// A signal source exceeded its allotted time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{signal} did not answer within {timeout_ms}ms")]
pub struct TimeoutError {
    pub signal: SignalSource,
    pub timeout_ms: u64,
}

/// Terminal failure of an asynchronous multi-vendor scan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Scan submission failed: {0}")]
    SubmissionFailed(#[source] ServiceError),

    #[error("Polling analysis {submission_id} failed: {source}")]
    PollFailed {
        submission_id: String,
        #[source]
        source: ServiceError,
    },

    #[error("Analysis {submission_id} still pending after {attempts} polls")]
    Exhausted { submission_id: String, attempts: u32 },

    #[error("Analysis {submission_id} passed its polling deadline after {attempts} polls")]
    DeadlinePassed { submission_id: String, attempts: u32 },

    #[error("No trusted vendor reported on the URL")]
    Inconclusive,
}

/// Every failure an adapter absorbs into an UNKNOWN result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Adapter task aborted: {0}")]
    Aborted(String),
}

impl SignalError {
    /// Short category name used as a structured logging field.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Service(_) => "service",
            Self::Extraction(_) => "extraction",
            Self::Model(_) => "model",
            Self::Timeout(_) => "timeout",
            Self::Scan(_) => "scan",
            Self::Aborted(_) => "aborted",
        }
    }
}
