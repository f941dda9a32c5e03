//! Benchmarks for the correction rule and full sessions

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qteleport::{resolve, BellStateKind, MeasurementOutcome, QuantumStateTag, SessionConfig, Simulator};

fn bench_resolve(c: &mut Criterion) {
    c.bench_function("resolve_all_pairs", |b| {
        b.iter(|| {
            for bell in BellStateKind::ALL {
                for outcome in MeasurementOutcome::ALL {
                    black_box(resolve(black_box(bell), black_box(outcome)));
                }
            }
        })
    });
}

fn bench_session(c: &mut Criterion) {
    let simulator = Simulator::new();
    let mut group = c.benchmark_group("session");
    for delay in [0i64, 500] {
        let config = SessionConfig::new(QuantumStateTag::Plus, BellStateKind::PhiPlus)
            .with_runtime(2_000)
            .with_delay(delay)
            .with_seed(42);
        group.bench_with_input(BenchmarkId::new("single", delay), &config, |b, config| {
            b.iter(|| simulator.run(black_box(config)))
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let simulator = Simulator::new();
    let config = SessionConfig::default();
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);
    for runs in [100usize, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(runs), &runs, |b, &runs| {
            b.iter(|| simulator.repeat(&config, runs, 0))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_session, bench_batch);
criterion_main!(benches);
