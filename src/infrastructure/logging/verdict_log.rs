//! Append-only JSON-lines record of every verdict.
//!
//! One line per check; extracted features are not recorded. Records are
//! queued to a single writer task, so recording never waits on the disk
//! and lines keep the order they were recorded in.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::domain::models::{DecisionPath, SignalSource, SignalStatus, Verdict};
use crate::domain::ports::verdict_sink::{self, VerdictSink};

const WRITER_STOPPED: &str = "verdict log writer stopped";

/// One verdict log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub decided_at: DateTime<Utc>,
    pub url: String,
    pub final_status: String,
    pub decision_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_score: Option<f64>,
    pub sources: BTreeMap<SignalSource, SignalStatus>,
}

impl VerdictRecord {
    pub fn new(url: &str, verdict: &Verdict) -> Self {
        Self {
            decided_at: verdict.decided_at(),
            url: url.to_string(),
            final_status: verdict.final_status().as_str().to_string(),
            decision_path: match verdict.decision_path() {
                DecisionPath::Weighted => "weighted",
                DecisionPath::ClassifierFallback => "classifier_fallback",
            }
            .to_string(),
            weighted_score: verdict.weighted_score(),
            sources: verdict
                .per_source()
                .iter()
                .map(|result| (result.source(), result.status()))
                .collect(),
        }
    }
}

enum WriterCommand {
    Append(VerdictRecord),
    Flush(oneshot::Sender<()>),
}

/// File-backed [`VerdictSink`].
#[derive(Clone)]
pub struct VerdictLog {
    commands: mpsc::UnboundedSender<WriterCommand>,
}

impl VerdictLog {
    /// Open `log_path` for appending, creating parent directories, and
    /// start the writer task.
    pub async fn new(log_path: impl AsRef<Path>) -> Result<Self> {
        let log_path = log_path.as_ref();

        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create verdict log directory")?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .await
            .with_context(|| format!("failed to open verdict log {}", log_path.display()))?;

        let (commands, queue) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(file, queue));

        Ok(Self { commands })
    }

    fn send(&self, command: WriterCommand) -> Result<()> {
        self.commands.send(command).map_err(|_| anyhow!(WRITER_STOPPED))
    }
}

async fn run_writer(mut file: File, mut queue: mpsc::UnboundedReceiver<WriterCommand>) {
    while let Some(command) = queue.recv().await {
        match command {
            WriterCommand::Append(record) => {
                if let Err(err) = write_record(&mut file, &record).await {
                    warn!(error = %err, "failed to write verdict");
                }
            }
            WriterCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("verdict log writer finished");
}

async fn write_record(file: &mut File, record: &VerdictRecord) -> Result<()> {
    let mut line = serde_json::to_string(record).context("failed to serialize verdict")?;
    line.push('\n');
    file.write_all(line.as_bytes())
        .await
        .context("failed to write verdict")?;
    file.flush().await.context("failed to flush verdict log")?;
    Ok(())
}

#[async_trait]
impl VerdictSink for VerdictLog {
    async fn record(&self, url: &str, verdict: &Verdict) -> verdict_sink::Result<()> {
        let record = VerdictRecord::new(url, verdict);
        debug!(final_status = %record.final_status, "verdict queued");
        self.send(WriterCommand::Append(record))?;
        Ok(())
    }

    async fn flush(&self) -> verdict_sink::Result<()> {
        let (done, flushed) = oneshot::channel();
        self.send(WriterCommand::Flush(done))?;
        flushed.await.map_err(|_| anyhow!(WRITER_STOPPED))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{PartialResultSet, SignalResult};
    use crate::services::VerdictAggregator;
    use tempfile::TempDir;

    fn sample_verdict() -> Verdict {
        let partial: PartialResultSet = [
            SignalResult::safe(SignalSource::ReputationList),
            SignalResult::unknown(SignalSource::MultiVendor, "Missing credential for virustotal"),
            SignalResult::malicious(SignalSource::Classifier),
        ]
        .into_iter()
        .collect();
        VerdictAggregator::default().decide(partial)
    }

    #[tokio::test]
    async fn test_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs/verdicts/verdicts.jsonl");

        let _log = VerdictLog::new(&log_path).await.unwrap();
        assert!(log_path.exists());
    }

    #[tokio::test]
    async fn test_appends_one_line_per_verdict() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("verdicts.jsonl");
        let log = VerdictLog::new(&log_path).await.unwrap();
        let verdict = sample_verdict();

        log.record("http://a.example", &verdict).await.unwrap();
        log.record("http://b.example", &verdict).await.unwrap();
        log.flush().await.unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let records: Vec<VerdictRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "http://a.example");
        assert_eq!(records[1].url, "http://b.example");
        assert_eq!(records[0].final_status, "unsafe");
        assert_eq!(records[0].decision_path, "weighted");
        assert_eq!(records[0].sources[&SignalSource::MultiVendor], SignalStatus::Unknown);
    }

    #[tokio::test]
    async fn test_reopen_preserves_existing_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("verdicts.jsonl");

        for url in ["http://first.example", "http://second.example"] {
            let log = VerdictLog::new(&log_path).await.unwrap();
            log.record(url, &sample_verdict()).await.unwrap();
            log.flush().await.unwrap();
        }

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_queued_records_keep_order() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("verdicts.jsonl");
        let log = VerdictLog::new(&log_path).await.unwrap();
        let verdict = sample_verdict();

        for i in 0..50 {
            log.record(&format!("http://{i}.example"), &verdict).await.unwrap();
        }
        log.flush().await.unwrap();

        let urls: Vec<String> = std::fs::read_to_string(&log_path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str::<VerdictRecord>(line).unwrap().url)
            .collect();
        let expected: Vec<String> = (0..50).map(|i| format!("http://{i}.example")).collect();
        assert_eq!(urls, expected);
    }

    #[tokio::test]
    async fn test_record_does_not_wait_for_the_disk() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("verdicts.jsonl");
        let log = VerdictLog::new(&log_path).await.unwrap();

        // Current-thread runtime: the writer task cannot run until this test yields.
        log.record("http://queued.example", &sample_verdict()).await.unwrap();
        assert!(std::fs::read_to_string(&log_path).unwrap().is_empty());

        log.flush().await.unwrap();
        assert_eq!(std::fs::read_to_string(&log_path).unwrap().lines().count(), 1);
    }
}
