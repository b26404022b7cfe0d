//! Weighted-voting verdict policy.
//!
//! Votes are SAFE = 1 and UNSAFE = 0. The reputation list is the primary
//! arbiter: when it is UNKNOWN the classifier's vote is returned as-is and
//! weights are ignored. Otherwise every source contributes
//! `vote * weight`, with an UNKNOWN multi-vendor or classifier result
//! counting as 0, and the URL is SAFE when the sum reaches the threshold.

use tracing::debug;

use crate::domain::models::{
    CheckConfig, DecisionPath, FinalStatus, PartialResultSet, SignalSource, Verdict,
    WeightsConfig,
};

/// Stateless voting policy configured with weights and a threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerdictAggregator {
    weights: WeightsConfig,
    threshold: f64,
}

impl VerdictAggregator {
    pub const fn new(weights: WeightsConfig, threshold: f64) -> Self {
        Self { weights, threshold }
    }

    pub const fn from_config(config: &CheckConfig) -> Self {
        Self::new(config.weights, config.threshold)
    }

    pub fn decide(&self, partial: PartialResultSet) -> Verdict {
        decide(partial, &self.weights, self.threshold)
    }
}

impl Default for VerdictAggregator {
    fn default() -> Self {
        Self::from_config(&CheckConfig::default())
    }
}

/// Fold a partial result set into a final verdict.
pub fn decide(partial: PartialResultSet, weights: &WeightsConfig, threshold: f64) -> Verdict {
    if !partial
        .status_of(SignalSource::ReputationList)
        .is_conclusive()
    {
        // An UNKNOWN classifier casts a 0 vote here as well.
        let vote = partial
            .status_of(SignalSource::Classifier)
            .vote()
            .unwrap_or(0.0);
        let final_status = status_for(vote, 1.0);

        debug!(
            final_status = %final_status,
            "reputation list unavailable, deferring to classifier"
        );
        return Verdict::new(
            final_status,
            partial,
            DecisionPath::ClassifierFallback,
            None,
        );
    }

    let score = weighted_score(&partial, weights);
    let final_status = status_for(score, threshold);

    debug!(
        score = score,
        threshold = threshold,
        final_status = %final_status,
        "weighted verdict"
    );
    Verdict::new(final_status, partial, DecisionPath::Weighted, Some(score))
}

/// Sum of `vote * weight` where UNKNOWN votes count as 0.
pub fn weighted_score(partial: &PartialResultSet, weights: &WeightsConfig) -> f64 {
    [
        (SignalSource::ReputationList, weights.reputation_list),
        (SignalSource::MultiVendor, weights.multi_vendor),
        (SignalSource::Classifier, weights.classifier),
    ]
    .into_iter()
    .map(|(source, weight)| partial.status_of(source).vote().unwrap_or(0.0) * weight)
    .sum()
}

fn status_for(score: f64, threshold: f64) -> FinalStatus {
    if score >= threshold {
        FinalStatus::Safe
    } else {
        FinalStatus::Unsafe
    }
}
