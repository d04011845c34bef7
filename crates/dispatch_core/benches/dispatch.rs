//! Performance benchmarks for dispatch_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::ecs::RiderId;
use dispatch_core::scenario::{build_scenario, run_scenario, ScenarioParams};
use dispatch_core::DispatchWorld;

fn bench_scenario_run(c: &mut Criterion) {
    let scenarios = vec![
        ("small", 50, 100),
        ("medium", 200, 500),
        ("large", 500, 1000),
    ];

    let mut group = c.benchmark_group("scenario_run");
    for (name, drivers, riders) in scenarios {
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(drivers, riders),
            |b, &(drivers, riders)| {
                b.iter(|| {
                    let params = ScenarioParams::default()
                        .with_drivers(drivers)
                        .with_riders(riders)
                        .with_seed(42);
                    let mut world = DispatchWorld::new();
                    build_scenario(&mut world, &params).expect("build scenario");
                    black_box(run_scenario(&mut world, &params));
                });
            },
        );
    }
    group.finish();
}

fn bench_nearest_driver_search(c: &mut Criterion) {
    // Driver counts from dense to a single far-away driver.
    let layouts = vec![("dense", 1_000), ("sparse", 20), ("single", 1)];

    let mut group = c.benchmark_group("nearest_driver_search");
    for (name, drivers) in layouts {
        let params = ScenarioParams::default()
            .with_drivers(drivers)
            .with_riders(1)
            .with_seed(7);
        let mut world = DispatchWorld::new();
        build_scenario(&mut world, &params).expect("build scenario");
        let rider = RiderId::from("r0");

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                // Re-requesting replaces the waiting request, so each iteration searches afresh.
                black_box(world.request_ride(&rider, 50, 50).ok());
            });
        });
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("advance_500_assigned_rides", |b| {
        b.iter_with_setup(
            || {
                let params = ScenarioParams::default()
                    .with_drivers(500)
                    .with_riders(500)
                    .with_accept_probability(1.0)
                    .with_max_ticks(0)
                    .with_seed(3);
                let mut world = DispatchWorld::new();
                build_scenario(&mut world, &params).expect("build scenario");
                run_scenario(&mut world, &params);
                world
            },
            |mut world| black_box(world.advance()),
        );
    });
}

criterion_group!(benches, bench_scenario_run, bench_nearest_driver_search, bench_tick);
criterion_main!(benches);
