//! # RRT Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use brain_lib::auto::{
    map::{AirspaceMap, MapParams},
    nav::{RrtParams, RrtPlanner},
};
use nalgebra::Point2;

const MAP: &str = r#"{
    "airspace": {"min": [0.0, 0.0, 0.0], "max": [5.0, 5.0, 2.0]},
    "walls": [
        {"plane": {"start": [1.5, 0.0, 0.0], "stop": [1.6, 3.5, 2.0]}},
        {"plane": {"start": [3.0, 1.5, 0.0], "stop": [3.1, 5.0, 2.0]}}
    ]
}"#;

fn rrt_benchmark(c: &mut Criterion) {
    let map = AirspaceMap::from_json(MAP, MapParams::default()).unwrap();

    c.bench_function("AirspaceMap::from_json", |b| {
        b.iter(|| AirspaceMap::from_json(MAP, MapParams::default()).unwrap())
    });

    c.bench_function("AirspaceMap::from_json::fine_grid", |b| {
        b.iter(|| {
            AirspaceMap::from_json(
                MAP,
                MapParams {
                    grid_resolution_m: 0.01,
                    ..Default::default()
                },
            )
            .unwrap()
        })
    });

    let mut planner = RrtPlanner::new(RrtParams {
        seed: Some(1),
        max_iterations: 20_000,
        ..Default::default()
    });

    c.bench_function("RrtPlanner::plan", |b| {
        b.iter(|| {
            planner
                .plan(Point2::new(0.5, 0.5), Point2::new(4.5, 0.5), &map)
                .ok()
        })
    });
}

criterion_group!(benches, rrt_benchmark);
criterion_main!(benches);
