//! Load tests for dispatch_core: validate throughput on large populations.

use dispatch_core::scenario::{build_scenario, run_scenario, ScenarioParams};
use dispatch_core::DispatchWorld;
use std::time::Instant;

#[test]
#[ignore] // Only run explicitly: cargo test --package dispatch_core --test load_tests -- --ignored
fn test_sustained_load() {
    let params = ScenarioParams::default()
        .with_drivers(2_000)
        .with_riders(4_000)
        .with_accept_probability(0.7)
        .with_seed(42);
    let mut world = DispatchWorld::new();
    build_scenario(&mut world, &params).expect("build scenario");

    let start = Instant::now();
    let summary = run_scenario(&mut world, &params);
    let duration = start.elapsed();

    let requests_per_sec = summary.requests as f64 / duration.as_secs_f64();
    println!(
        "Sustained load test: {} requests, {} completed, {} ticks in {:.2}s ({:.0} requests/sec)",
        summary.requests,
        summary.completed,
        summary.ticks,
        duration.as_secs_f64(),
        requests_per_sec
    );

    assert_eq!(summary.completed, summary.assigned);
    assert!(
        requests_per_sec > 500.0,
        "Should process >500 requests/sec, got {:.0}",
        requests_per_sec
    );
}

#[test]
#[ignore]
fn test_sparse_supply() {
    // Few drivers far apart: every search scans most of the grid.
    let params = ScenarioParams::default()
        .with_drivers(3)
        .with_riders(2_000)
        .with_accept_probability(0.0)
        .with_seed(7);
    let mut world = DispatchWorld::new();
    build_scenario(&mut world, &params).expect("build scenario");

    let start = Instant::now();
    let summary = run_scenario(&mut world, &params);
    let duration = start.elapsed();
    println!(
        "Sparse supply test: {} requests, {} rejections in {:.2}s",
        summary.requests,
        summary.rejections,
        duration.as_secs_f64()
    );

    assert_eq!(summary.cancelled, summary.requests);
    assert_eq!(summary.rejections, summary.requests * 3);
}
