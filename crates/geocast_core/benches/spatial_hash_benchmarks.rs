use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geocast_core::spatial_hash::SpatialHash;
use geocast_data::Position;

fn grid_positions() -> Vec<Position> {
    (0..1000)
        .map(|i| {
            let x = (i % 100) as f64 * 10.0;
            let y = (i / 100) as f64 * 10.0;
            let z = (i % 7) as f64;
            Position::new(x, y, z)
        })
        .collect()
}

fn bench_spatial_hash_build(c: &mut Criterion) {
    let positions = grid_positions();

    c.bench_function("spatial_hash_build_1000", |b| {
        b.iter(|| {
            let mut spatial = SpatialHash::new(15.0);
            spatial.build(&positions);
            black_box(spatial)
        })
    });
}

fn bench_spatial_hash_query(c: &mut Criterion) {
    let positions = grid_positions();
    let mut spatial = SpatialHash::new(15.0);
    spatial.build(&positions);

    c.bench_function("spatial_hash_query_15_radius", |b| {
        let mut results = Vec::new();
        b.iter(|| {
            spatial.query_into(&Position::new(500.0, 50.0, 3.0), 15.0, &mut results);
            black_box(results.len())
        })
    });
}

criterion_group!(benches, bench_spatial_hash_build, bench_spatial_hash_query);
criterion_main!(benches);
