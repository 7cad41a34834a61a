use core_server::{DistanceApplier, DistanceControlConfig, DistanceController};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

struct NullApplier;

impl DistanceApplier for NullApplier {
    fn apply_view_distance(&mut self, _distance: i32) {}
    fn apply_simulation_distance(&mut self, _distance: i32) {}
}

fn bench_adjust(c: &mut Criterion) {
    let mut group = c.benchmark_group("regulate");

    group.bench_function("steady_alternation", |b| {
        b.iter_batched(
            || {
                let config = DistanceControlConfig {
                    log_adjustments: false,
                    ..DistanceControlConfig::default()
                };
                DistanceController::new(config).expect("default bounds are valid")
            },
            |mut controller| {
                let mut applier = NullApplier;
                for round in 0..256u32 {
                    let mean = if round % 2 == 0 { 30.0 } else { 60.0 };
                    controller.adjust(mean, true, &mut applier);
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(regulate_benches, bench_adjust);
criterion_main!(regulate_benches);
