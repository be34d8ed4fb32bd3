//! Retry executor benchmarks
//!
//! Measures backoff arithmetic, jitter sampling and the executor's own
//! overhead (sleeps are replaced by a no-op sleeper so only the retry
//! machinery is timed).
//!
//! Run with: `cargo bench --bench retry_bench -p bizcomply-resilience`

use std::time::Duration;

use bizcomply_resilience::retry::backoff::{compute_backoff, full_jitter, next_wait};
use bizcomply_resilience::retry::SleepStatus;
use bizcomply_resilience::{BlockingSleep, CommonError, FailureKind, RetryPolicy, RetryPresets};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

/// Returns immediately so benchmarks time the retry loop, not the clock
struct NoSleep;

impl BlockingSleep for NoSleep {
    fn sleep(&self, _duration: Duration, _cancel: Option<&CancellationToken>) -> SleepStatus {
        SleepStatus::Completed
    }
}

fn quiet_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::builder()
        .max_retries(max_retries)
        .min_wait(Duration::from_millis(100))
        .max_wait(Duration::from_secs(10))
        .retry_on([FailureKind::Network])
        .log_retries(false)
        .build()
        .expect("valid retry policy for benchmarks")
}

fn bench_backoff_calculations(c: &mut Criterion) {
    let mut group = c.benchmark_group("retry_backoff");
    let policy = RetryPresets::http().to_builder().no_jitter().build().expect("valid policy");

    for attempt in [0_u32, 3, 10, 64] {
        group.bench_with_input(BenchmarkId::new("compute_backoff", attempt), &attempt, |b, &a| {
            b.iter(|| black_box(compute_backoff(&policy, black_box(a))));
        });
    }

    group.bench_function("full_jitter_seeded", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| black_box(full_jitter(black_box(Duration::from_secs(8)), &mut rng)));
    });

    group.bench_function("next_wait_thread_rng", |b| {
        let jittered = RetryPresets::http();
        b.iter(|| black_box(next_wait(&jittered, black_box(2))));
    });

    group.finish();
}

fn bench_blocking_executor(c: &mut Criterion) {
    let mut group = c.benchmark_group("retry_blocking_executor");

    group.bench_function("first_attempt_success", |b| {
        let policy = quiet_policy(3);
        let executor = policy.executor().with_sleeper(NoSleep);
        b.iter(|| {
            let result = executor.execute_blocking(|| Ok::<_, CommonError>(black_box(1_u32)));
            black_box(result)
        });
    });

    for retries in [1_u32, 5, 20] {
        group.bench_with_input(BenchmarkId::new("exhaust", retries), &retries, |b, &n| {
            let policy = quiet_policy(n);
            let executor = policy.executor().with_sleeper(NoSleep);
            b.iter(|| {
                let result: Result<(), _> = executor
                    .execute_blocking(|| Err(CommonError::network("bench", "unreachable")));
                black_box(result)
            });
        });
    }

    group.finish();
}

fn bench_async_executor(c: &mut Criterion) {
    let mut group = c.benchmark_group("retry_async_executor");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("tokio runtime for benchmarks");

    group.bench_function("first_attempt_success", |b| {
        let policy = quiet_policy(3);
        b.iter(|| {
            runtime.block_on(async {
                let result =
                    policy.retry(|| async { Ok::<_, CommonError>(black_box(1_u32)) }).await;
                black_box(result)
            })
        });
    });

    group.bench_function("non_retryable_failure", |b| {
        let policy = quiet_policy(3);
        b.iter(|| {
            runtime.block_on(async {
                let result = policy
                    .retry(|| async { Err::<(), _>(CommonError::validation("query", "empty")) })
                    .await;
                black_box(result)
            })
        });
    });

    group.finish();
}

criterion_group!(retry, bench_backoff_calculations, bench_blocking_executor, bench_async_executor);
criterion_main!(retry);
