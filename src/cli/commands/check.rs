//! Implementation of the `safelink check` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::progress::{create_spinner_with_message, ProgressBarExt};
use crate::cli::output::table::{colorize_final, colorize_status, list_table};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{
    Config, DecisionPath, FinalStatus, SignalSource, SignalStatus, Verdict,
};
use crate::infrastructure::setup::build_checker;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// URL to evaluate
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SourceOutput {
    pub source: SignalSource,
    pub status: SignalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub url: String,
    pub final_status: FinalStatus,
    pub decision_path: DecisionPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_score: Option<f64>,
    pub sources: Vec<SourceOutput>,
}

impl CheckOutput {
    pub fn new(url: &str, verdict: &Verdict) -> Self {
        Self {
            url: url.to_string(),
            final_status: verdict.final_status(),
            decision_path: verdict.decision_path(),
            weighted_score: verdict.weighted_score(),
            sources: verdict
                .per_source()
                .iter()
                .map(|result| SourceOutput {
                    source: result.source(),
                    status: result.status(),
                    raw_score: result.raw_score(),
                    error: result.error().map(str::to_string),
                })
                .collect(),
        }
    }
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["source", "status", "score", "detail"]);
        for source in &self.sources {
            table.add_row(vec![
                source.source.to_string(),
                colorize_status(source.status).to_string(),
                source
                    .raw_score
                    .map_or_else(|| "-".to_string(), |score| format!("{score:.2}")),
                source
                    .error
                    .as_deref()
                    .map_or_else(String::new, |error| truncate(error, 60)),
            ]);
        }

        let decided_by = match self.decision_path {
            DecisionPath::Weighted => self.weighted_score.map_or_else(
                || "weighted vote".to_string(),
                |score| format!("weighted vote, score {score:.3}"),
            ),
            DecisionPath::ClassifierFallback => "classifier fallback".to_string(),
        };

        format!(
            "{}\n\n{}\n\nVerdict: {} ({})",
            self.url,
            table,
            colorize_final(self.final_status),
            decided_by
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CheckArgs, config: &Config, json_mode: bool) -> Result<()> {
    let checker = build_checker(config)
        .await
        .context("Failed to initialize URL checker")?;

    let spinner = create_spinner_with_message(format!("Checking {}", args.url), json_mode);
    let verdict = match checker.check_url(&args.url).await {
        Ok(verdict) => verdict,
        Err(err) => {
            spinner.finish_error("Check rejected");
            return Err(err).context("Invalid URL");
        }
    };
    spinner.finish_success(format!("Checked {}", args.url.trim()));
    checker.flush().await;

    output(&CheckOutput::new(args.url.trim(), &verdict), json_mode);
    Ok(())
}
