use proptest::prelude::*;
use safelink::domain::models::{
    DecisionPath, FinalStatus, PartialResultSet, SignalResult, SignalSource, SignalStatus,
    WeightsConfig,
};
use safelink::services::{decide, weighted_score};

fn status_strategy() -> impl Strategy<Value = SignalStatus> {
    prop_oneof![
        Just(SignalStatus::Safe),
        Just(SignalStatus::Unsafe),
        Just(SignalStatus::Unknown),
    ]
}

fn weights_strategy() -> impl Strategy<Value = WeightsConfig> {
    (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(|(reputation_list, multi_vendor, classifier)| {
        WeightsConfig {
            reputation_list,
            multi_vendor,
            classifier,
        }
    })
}

fn result(source: SignalSource, status: SignalStatus) -> SignalResult {
    match status {
        SignalStatus::Safe => SignalResult::safe(source),
        SignalStatus::Unsafe => SignalResult::malicious(source),
        SignalStatus::Unknown => SignalResult::unknown(source, "unavailable"),
    }
}

fn partial(rl: SignalStatus, mv: SignalStatus, cl: SignalStatus) -> PartialResultSet {
    [
        result(SignalSource::ReputationList, rl),
        result(SignalSource::MultiVendor, mv),
        result(SignalSource::Classifier, cl),
    ]
    .into_iter()
    .collect()
}

proptest! {
    /// Property: with the reputation list UNKNOWN the classifier decides alone
    ///
    /// Weights and threshold have no influence; an UNKNOWN classifier
    /// votes 0.
    #[test]
    fn prop_reputation_unknown_defers_to_classifier(
        mv in status_strategy(),
        cl in status_strategy(),
        weights in weights_strategy(),
        threshold in 0.01f64..=1.0,
    ) {
        let verdict = decide(partial(SignalStatus::Unknown, mv, cl), &weights, threshold);

        let expected = if cl == SignalStatus::Safe { FinalStatus::Safe } else { FinalStatus::Unsafe };
        prop_assert_eq!(verdict.final_status(), expected);
        prop_assert_eq!(verdict.decision_path(), DecisionPath::ClassifierFallback);
        prop_assert!(verdict.weighted_score().is_none());
    }

    /// Property: with a conclusive reputation list, SAFE iff score >= threshold
    #[test]
    fn prop_weighted_verdict_matches_threshold(
        rl in prop_oneof![Just(SignalStatus::Safe), Just(SignalStatus::Unsafe)],
        mv in status_strategy(),
        cl in status_strategy(),
        weights in weights_strategy(),
        threshold in 0.01f64..=1.0,
    ) {
        let set = partial(rl, mv, cl);
        let score = weighted_score(&set, &weights);
        let verdict = decide(set, &weights, threshold);

        prop_assert_eq!(verdict.decision_path(), DecisionPath::Weighted);
        prop_assert_eq!(verdict.weighted_score(), Some(score));
        prop_assert_eq!(verdict.final_status().is_safe(), score >= threshold);
    }

    /// Property: turning any UNKNOWN into SAFE never lowers the score
    #[test]
    fn prop_unknown_counts_as_zero(
        rl in status_strategy(),
        mv in status_strategy(),
        cl in status_strategy(),
        weights in weights_strategy(),
    ) {
        let lift = |s: SignalStatus| if s == SignalStatus::Unknown { SignalStatus::Safe } else { s };
        let lowered = weighted_score(&partial(rl, mv, cl), &weights);
        let lifted = weighted_score(&partial(lift(rl), lift(mv), lift(cl)), &weights);

        prop_assert!(lifted >= lowered);
        prop_assert!(lowered >= 0.0);
        prop_assert!(lifted <= weights.reputation_list + weights.multi_vendor + weights.classifier + 1e-12);
    }

    /// Property: the verdict carries every per-source result unchanged
    #[test]
    fn prop_verdict_keeps_per_source_results(
        rl in status_strategy(),
        mv in status_strategy(),
        cl in status_strategy(),
    ) {
        let set = partial(rl, mv, cl);
        let verdict = decide(set.clone(), &WeightsConfig::default(), 0.66);

        prop_assert_eq!(verdict.per_source(), &set);
        prop_assert_eq!(verdict.per_source().len(), 3);
    }

    /// Property: deciding twice over the same results gives the same status
    #[test]
    fn prop_decision_is_deterministic(
        rl in status_strategy(),
        mv in status_strategy(),
        cl in status_strategy(),
        weights in weights_strategy(),
        threshold in 0.01f64..=1.0,
    ) {
        let first = decide(partial(rl, mv, cl), &weights, threshold);
        let second = decide(partial(rl, mv, cl), &weights, threshold);
        prop_assert_eq!(first.final_status(), second.final_status());
    }
}

#[test]
fn test_equal_thirds_examples() {
    let weights = WeightsConfig::default();

    let all_safe = decide(
        partial(SignalStatus::Safe, SignalStatus::Safe, SignalStatus::Safe),
        &weights,
        0.66,
    );
    assert_eq!(all_safe.final_status(), FinalStatus::Safe);

    let degraded = decide(
        partial(SignalStatus::Safe, SignalStatus::Unknown, SignalStatus::Unsafe),
        &weights,
        0.66,
    );
    assert_eq!(degraded.final_status(), FinalStatus::Unsafe);
    assert!((degraded.weighted_score().unwrap() - 1.0 / 3.0).abs() < 1e-9);
}
