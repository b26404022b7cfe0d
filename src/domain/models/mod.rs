pub mod config;
pub mod features;
pub mod scan;
pub mod signal;
pub mod verdict;

pub use config::{
    CheckConfig, ClassifierConfig, Config, LogFormat, LoggingConfig, RetryConfig,
    RotationPolicy, SafeBrowsingConfig, ServerConfig, VerdictLogConfig, VirusTotalConfig,
    WeightsConfig, DEFAULT_TRUSTED_VENDORS,
};
pub use features::FeatureVector;
pub use scan::{AnalysisReport, AnalysisStatus, EngineVerdict, SubmissionId};
pub use signal::{DuplicateSource, PartialResultSet, SignalResult, SignalSource, SignalStatus};
pub use verdict::{DecisionPath, FinalStatus, Verdict};
