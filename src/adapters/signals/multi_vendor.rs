//! Multi-vendor adapter: submit, poll, then tally trusted engines.
//!
//! The scan runs as an explicit state machine:
//!
//! ```text
//! Submitting -> Polling -> Completed
//!      |           |  \
//!      v           v   -> TimedOut (poll ceiling or deadline reached)
//!    Failed      Failed (non-success poll)
//! ```
//!
//! The polling deadline is the poll interval times the attempt ceiling,
//! counted from the end of the settle delay.
//!
//! Failed and TimedOut both surface as UNKNOWN. Delays go through the
//! [`Sleeper`] port.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::absorb;
use crate::domain::error::ScanError;
use crate::domain::models::{
    AnalysisReport, CheckConfig, SignalResult, SignalSource, SubmissionId, VirusTotalConfig,
};
use crate::domain::ports::{MultiVendorClient, SignalAdapter, Sleeper, TokioSleeper};

const SOURCE: SignalSource = SignalSource::MultiVendor;

/// Timing and classification parameters of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub settle_delay: Duration,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub trusted_vendors: BTreeSet<String>,
    pub malicious_threshold: u32,
}

impl ScanSettings {
    /// Wall-clock budget for the polling phase; `None` when it does not fit
    /// in a `Duration`.
    pub fn poll_budget(&self) -> Option<Duration> {
        self.poll_interval.checked_mul(self.max_poll_attempts)
    }

    pub fn from_config(check: &CheckConfig, virustotal: &VirusTotalConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(virustotal.settle_delay_ms),
            poll_interval: Duration::from_millis(virustotal.poll_interval_ms),
            max_poll_attempts: virustotal.max_poll_attempts,
            trusted_vendors: check.trusted_vendors.clone(),
            malicious_threshold: check.malicious_vendor_threshold,
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from_config(&CheckConfig::default(), &VirusTotalConfig::default())
    }
}

/// Bookkeeping for one submitted analysis.
#[derive(Debug)]
struct ScanJob {
    submission_id: SubmissionId,
    poll_attempt: u32,
    deadline: Option<Instant>,
}

impl ScanJob {
    fn past_deadline(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[derive(Debug)]
enum ScanState {
    Submitting,
    Polling(ScanJob),
    Completed(AnalysisReport),
    Failed(ScanError),
    TimedOut(ScanError),
}

impl ScanState {
    const fn name(&self) -> &'static str {
        match self {
            Self::Submitting => "submitting",
            Self::Polling(_) => "polling",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
            Self::TimedOut(_) => "timed_out",
        }
    }
}

/// Trusted-engine counts from a completed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedTally {
    /// Trusted engines present in the report
    pub checked: u32,
    /// Trusted engines that flagged the URL malicious
    pub malicious: u32,
}

/// Count trusted engines present in a report and how many flag it malicious.
pub fn tally_trusted(report: &AnalysisReport, trusted_vendors: &BTreeSet<String>) -> TrustedTally {
    let mut tally = TrustedTally {
        checked: 0,
        malicious: 0,
    };
    for verdict in trusted_vendors
        .iter()
        .filter_map(|vendor| report.results.get(vendor))
    {
        tally.checked += 1;
        if verdict.is_malicious() {
            tally.malicious += 1;
        }
    }
    tally
}

/// Wraps an asynchronous multi-vendor scan service.
pub struct MultiVendorAdapter {
    client: Arc<dyn MultiVendorClient>,
    sleeper: Arc<dyn Sleeper>,
    settings: ScanSettings,
}

impl MultiVendorAdapter {
    pub fn new(client: Arc<dyn MultiVendorClient>, settings: ScanSettings) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
            settings,
        }
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Drive the scan state machine to a terminal state.
    async fn run_scan(&self, url: &str) -> Result<AnalysisReport, ScanError> {
        let mut state = ScanState::Submitting;

        loop {
            let next = match state {
                ScanState::Submitting => self.submit(url).await,
                ScanState::Polling(job) => self.poll(job).await,
                ScanState::Completed(report) => return Ok(report),
                ScanState::Failed(err) | ScanState::TimedOut(err) => return Err(err),
            };
            debug!(source = %SOURCE, state = next.name(), "scan transition");
            state = next;
        }
    }

    async fn submit(&self, url: &str) -> ScanState {
        match self.client.submit(url).await {
            Ok(submission_id) => {
                info!(source = %SOURCE, submission_id = %submission_id, "url submitted for analysis");
                self.sleeper.sleep(self.settings.settle_delay).await;
                let deadline = self
                    .settings
                    .poll_budget()
                    .and_then(|budget| Instant::now().checked_add(budget));
                ScanState::Polling(ScanJob {
                    submission_id,
                    poll_attempt: 0,
                    deadline,
                })
            }
            Err(err) => ScanState::Failed(ScanError::SubmissionFailed(err)),
        }
    }

    async fn poll(&self, mut job: ScanJob) -> ScanState {
        if job.poll_attempt >= self.settings.max_poll_attempts {
            debug!(source = %SOURCE, submission_id = %job.submission_id, "poll ceiling reached");
            return ScanState::TimedOut(ScanError::Exhausted {
                submission_id: job.submission_id.to_string(),
                attempts: job.poll_attempt,
            });
        }
        if job.poll_attempt > 0 && job.past_deadline() {
            debug!(source = %SOURCE, submission_id = %job.submission_id, "poll deadline passed");
            return ScanState::TimedOut(ScanError::DeadlinePassed {
                submission_id: job.submission_id.to_string(),
                attempts: job.poll_attempt,
            });
        }

        job.poll_attempt += 1;
        match self.client.poll(&job.submission_id).await {
            Ok(report) if report.status.is_completed() => ScanState::Completed(report),
            Ok(report) => {
                debug!(
                    source = %SOURCE,
                    attempt = job.poll_attempt,
                    status = ?report.status,
                    "analysis pending"
                );
                if job.poll_attempt < self.settings.max_poll_attempts {
                    self.sleeper.sleep(self.settings.poll_interval).await;
                }
                ScanState::Polling(job)
            }
            Err(source) => ScanState::Failed(ScanError::PollFailed {
                submission_id: job.submission_id.to_string(),
                source,
            }),
        }
    }

    fn classify(&self, report: &AnalysisReport) -> SignalResult {
        let tally = tally_trusted(report, &self.settings.trusted_vendors);
        info!(
            source = %SOURCE,
            checked = tally.checked,
            malicious = tally.malicious,
            "trusted vendors tallied"
        );

        if tally.checked == 0 {
            absorb(SOURCE, ScanError::Inconclusive)
        } else if tally.malicious >= self.settings.malicious_threshold {
            SignalResult::malicious(SOURCE).with_raw_score(f64::from(tally.malicious))
        } else {
            SignalResult::safe(SOURCE).with_raw_score(f64::from(tally.malicious))
        }
    }
}

#[async_trait]
impl SignalAdapter for MultiVendorAdapter {
    fn source(&self) -> SignalSource {
        SOURCE
    }

    async fn check(&self, url: &str) -> SignalResult {
        match self.run_scan(url).await {
            Ok(report) => self.classify(&report),
            Err(err) => absorb(SOURCE, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ServiceError;
    use crate::domain::models::{AnalysisStatus, EngineVerdict, SignalStatus};
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    struct ScriptedClient {
        submit: Result<SubmissionId, ServiceError>,
        polls: Mutex<VecDeque<Result<AnalysisReport, ServiceError>>>,
        poll_calls: AtomicU32,
    }

    impl ScriptedClient {
        fn new(polls: Vec<Result<AnalysisReport, ServiceError>>) -> Self {
            Self {
                submit: Ok(SubmissionId::new("u-abc-123")),
                polls: Mutex::new(polls.into()),
                poll_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl MultiVendorClient for ScriptedClient {
        async fn submit(&self, _url: &str) -> Result<SubmissionId, ServiceError> {
            self.submit.clone()
        }

        async fn poll(&self, _submission: &SubmissionId) -> Result<AnalysisReport, ServiceError> {
            self.poll_calls.fetch_add(1, Ordering::SeqCst);
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(pending()))
        }
    }

    fn pending() -> AnalysisReport {
        AnalysisReport {
            status: AnalysisStatus::InProgress,
            results: HashMap::new(),
        }
    }

    fn completed(engines: &[(&str, &str)]) -> AnalysisReport {
        AnalysisReport {
            status: AnalysisStatus::Completed,
            results: engines
                .iter()
                .map(|(name, category)| {
                    (
                        (*name).to_string(),
                        EngineVerdict {
                            category: (*category).to_string(),
                            result: None,
                        },
                    )
                })
                .collect(),
        }
    }

    fn report_with_malicious(count: usize) -> AnalysisReport {
        let trusted = ["Kaspersky", "ESET", "BitDefender", "Fortinet", "Sophos", "Dr.Web", "Webroot"];
        let engines: Vec<(&str, &str)> = trusted
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, if i < count { "malicious" } else { "harmless" }))
            .collect();
        completed(&engines)
    }

    fn adapter(client: Arc<ScriptedClient>, sleeper: Arc<RecordingSleeper>) -> MultiVendorAdapter {
        MultiVendorAdapter::new(client, ScanSettings::default()).with_sleeper(sleeper)
    }

    #[tokio::test]
    async fn test_five_trusted_flags_is_unsafe() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(report_with_malicious(5))]));
        let result = adapter(client, Arc::default()).check("http://bad.example").await;

        assert_eq!(result.status(), SignalStatus::Unsafe);
        assert_eq!(result.raw_score(), Some(5.0));
    }

    #[tokio::test]
    async fn test_four_trusted_flags_is_safe() {
        let client = Arc::new(ScriptedClient::new(vec![Ok(report_with_malicious(4))]));
        let result = adapter(client, Arc::default()).check("http://meh.example").await;

        assert_eq!(result.status(), SignalStatus::Safe);
        assert_eq!(result.raw_score(), Some(4.0));
    }

    #[tokio::test]
    async fn test_no_trusted_vendor_is_unknown() {
        let report = completed(&[("SomeEngine", "malicious"), ("OtherEngine", "malicious")]);
        let client = Arc::new(ScriptedClient::new(vec![Ok(report)]));
        let result = adapter(client, Arc::default()).check("http://odd.example").await;

        assert_eq!(result.status(), SignalStatus::Unknown);
        assert_eq!(result.error(), Some("No trusted vendor reported on the URL"));
    }

    #[tokio::test]
    async fn test_untrusted_flags_are_ignored() {
        let report = completed(&[
            ("Kaspersky", "harmless"),
            ("EngineA", "malicious"),
            ("EngineB", "malicious"),
            ("EngineC", "malicious"),
            ("EngineD", "malicious"),
            ("EngineE", "malicious"),
        ]);
        let client = Arc::new(ScriptedClient::new(vec![Ok(report)]));
        let result = adapter(client, Arc::default()).check("http://ok.example").await;
        assert_eq!(result.status(), SignalStatus::Safe);
    }

    #[tokio::test]
    async fn test_polls_until_completed_with_settle_and_interval() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(pending()),
            Ok(pending()),
            Ok(report_with_malicious(0)),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let result = adapter(client.clone(), sleeper.clone()).check("http://fine.example").await;

        assert_eq!(result.status(), SignalStatus::Safe);
        assert_eq!(client.poll_calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *sleeper.slept.lock().unwrap(),
            vec![
                Duration::from_secs(5),
                Duration::from_secs(2),
                Duration::from_secs(2)
            ]
        );
    }

    #[tokio::test]
    async fn test_poll_ceiling_times_out() {
        let client = Arc::new(ScriptedClient::new(vec![]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let result = adapter(client.clone(), sleeper.clone()).check("http://slow.example").await;

        assert_eq!(result.status(), SignalStatus::Unknown);
        assert_eq!(client.poll_calls.load(Ordering::SeqCst), 10);
        assert!(result.error().unwrap().contains("after 10 polls"));
        // settle delay plus one interval between each pair of polls
        assert_eq!(sleeper.slept.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_poll_error_fails_immediately() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok(pending()),
            Err(ServiceError::NotFound),
            Ok(report_with_malicious(7)),
        ]));
        let result = adapter(client.clone(), Arc::default()).check("http://gone.example").await;

        assert_eq!(result.status(), SignalStatus::Unknown);
        assert_eq!(client.poll_calls.load(Ordering::SeqCst), 2);
        assert!(result.error().unwrap().contains("Resource not found"));
    }

    #[tokio::test]
    async fn test_submission_failure_skips_polling() {
        let mut client = ScriptedClient::new(vec![Ok(report_with_malicious(7))]);
        client.submit = Err(ServiceError::MissingCredential("virustotal"));
        let client = Arc::new(client);
        let sleeper = Arc::new(RecordingSleeper::default());

        let result = adapter(client.clone(), sleeper.clone()).check("http://x.example").await;

        assert_eq!(result.status(), SignalStatus::Unknown);
        assert_eq!(client.poll_calls.load(Ordering::SeqCst), 0);
        assert!(sleeper.slept.lock().unwrap().is_empty());
    }

    struct SlowPollClient {
        poll_latency: Duration,
        poll_calls: AtomicU32,
    }

    #[async_trait]
    impl MultiVendorClient for SlowPollClient {
        async fn submit(&self, _url: &str) -> Result<SubmissionId, ServiceError> {
            Ok(SubmissionId::new("u-slow"))
        }

        async fn poll(&self, _submission: &SubmissionId) -> Result<AnalysisReport, ServiceError> {
            self.poll_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.poll_latency).await;
            Ok(pending())
        }
    }

    #[tokio::test]
    async fn test_deadline_ends_polling_before_ceiling() {
        let client = Arc::new(SlowPollClient {
            poll_latency: Duration::from_millis(40),
            poll_calls: AtomicU32::new(0),
        });
        let settings = ScanSettings {
            poll_interval: Duration::from_millis(1),
            max_poll_attempts: 10,
            ..ScanSettings::default()
        };
        let adapter = MultiVendorAdapter::new(client.clone(), settings)
            .with_sleeper(Arc::new(RecordingSleeper::default()));

        let result = adapter.check("http://slow.example").await;

        assert_eq!(result.status(), SignalStatus::Unknown);
        assert_eq!(client.poll_calls.load(Ordering::SeqCst), 1);
        assert!(result.error().unwrap().contains("deadline"));
    }

    #[tokio::test]
    async fn test_oversized_poll_settings_do_not_overflow() {
        let settings = ScanSettings {
            poll_interval: Duration::MAX,
            max_poll_attempts: 3,
            ..ScanSettings::default()
        };
        assert_eq!(settings.poll_budget(), None);

        let client = Arc::new(ScriptedClient::new(vec![Ok(pending()), Ok(report_with_malicious(5))]));
        let result = MultiVendorAdapter::new(client.clone(), settings)
            .with_sleeper(Arc::new(RecordingSleeper::default()))
            .check("http://bad.example")
            .await;

        assert_eq!(result.status(), SignalStatus::Unsafe);
        assert_eq!(client.poll_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_poll_budget() {
        assert_eq!(ScanSettings::default().poll_budget(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_tally_counts_only_present_trusted_vendors() {
        let report = completed(&[("ESET", "malicious"), ("Sophos", "suspicious"), ("Other", "malicious")]);
        let tally = tally_trusted(&report, &ScanSettings::default().trusted_vendors);
        assert_eq!(tally, TrustedTally { checked: 2, malicious: 1 });
    }
}
