//! Service layer: the aggregation core.
//!
//! - `fan_out`: concurrent adapter execution with per-adapter ceilings
//! - `aggregator`: weighted-voting verdict policy with degraded mode
//! - `url_checker`: validation plus fan-out plus aggregation

pub mod aggregator;
pub mod fan_out;
pub mod url_checker;

pub use aggregator::{decide, weighted_score, VerdictAggregator};
pub use fan_out::run_checks;
pub use url_checker::UrlChecker;
