//! Retry policy performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crm_api_client::utils::error::{classify, Failure, TransportError};
use crm_api_client::{ApiError, RetryPolicy};

/// Benchmark backoff computation per attempt
fn bench_delay_for(c: &mut Criterion) {
    let policy = RetryPolicy::default();

    let mut group = c.benchmark_group("delay_for");

    for attempt in [0u32, 2, 5, 30].iter() {
        group.bench_with_input(BenchmarkId::new("attempt", attempt), attempt, |b, attempt| {
            b.iter(|| black_box(policy.delay_for(black_box(*attempt), black_box(0.5))))
        });
    }

    group.finish();
}

/// Benchmark the full decision including jitter sampling
fn bench_decide(c: &mut Criterion) {
    let policy = RetryPolicy::default();
    let retryable = ApiError::from_status(503, "unavailable");
    let terminal = ApiError::from_status(401, "expired");

    c.bench_function("decide_retryable", |b| {
        b.iter(|| black_box(policy.decide(black_box(1), &retryable)))
    });
    c.bench_function("decide_terminal", |b| {
        b.iter(|| black_box(policy.decide(black_box(1), &terminal)))
    });
}

/// Benchmark failure classification
fn bench_classify(c: &mut Criterion) {
    c.bench_function("classify_transport", |b| {
        b.iter(|| {
            black_box(classify(Failure::Transport(TransportError::Connect(
                "connection refused".to_string(),
            ))))
        })
    });
    c.bench_function("classify_status", |b| {
        b.iter(|| {
            black_box(classify(Failure::Status {
                status: black_box(502),
                message: "bad gateway".to_string(),
            }))
        })
    });
}

criterion_group!(benches, bench_delay_for, bench_decide, bench_classify);

criterion_main!(benches);
