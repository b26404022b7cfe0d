use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use safelink::domain::models::{
    CheckConfig, PartialResultSet, SignalResult, SignalSource, SignalStatus,
};
use safelink::{SignalAdapter, UrlChecker, VerdictAggregator};
use std::sync::Arc;

const STATUSES: [SignalStatus; 3] = [SignalStatus::Safe, SignalStatus::Unsafe, SignalStatus::Unknown];

fn result(source: SignalSource, status: SignalStatus) -> SignalResult {
    match status {
        SignalStatus::Safe => SignalResult::safe(source),
        SignalStatus::Unsafe => SignalResult::malicious(source),
        SignalStatus::Unknown => SignalResult::unknown(source, "unavailable"),
    }
}

/// Every combination of the three tri-state sources.
fn all_partials() -> Vec<PartialResultSet> {
    let mut partials = Vec::with_capacity(27);
    for rl in STATUSES {
        for mv in STATUSES {
            for cl in STATUSES {
                partials.push(
                    [
                        result(SignalSource::ReputationList, rl),
                        result(SignalSource::MultiVendor, mv),
                        result(SignalSource::Classifier, cl),
                    ]
                    .into_iter()
                    .collect(),
                );
            }
        }
    }
    partials
}

fn bench_decide(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let aggregator = VerdictAggregator::default();
    let partials = all_partials();

    group.throughput(Throughput::Elements(partials.len() as u64));
    group.bench_function("decide_all_combinations", |b| {
        b.iter(|| {
            for partial in &partials {
                black_box(aggregator.decide(partial.clone()));
            }
        });
    });
    group.finish();
}

struct InstantAdapter(SignalSource);

#[async_trait]
impl SignalAdapter for InstantAdapter {
    fn source(&self) -> SignalSource {
        self.0
    }

    async fn check(&self, _url: &str) -> SignalResult {
        SignalResult::safe(self.0)
    }
}

fn bench_check_url(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let adapters: Vec<Arc<dyn SignalAdapter>> = SignalSource::ALL
        .into_iter()
        .map(|source| Arc::new(InstantAdapter(source)) as Arc<dyn SignalAdapter>)
        .collect();
    let checker = UrlChecker::new(adapters, &CheckConfig::default()).unwrap();

    c.bench_function("check_url_fan_out", |b| {
        b.to_async(&runtime)
            .iter(|| async { black_box(checker.check_url("https://example.com").await) });
    });
}

criterion_group!(benches, bench_decide, bench_check_url);
criterion_main!(benches);
