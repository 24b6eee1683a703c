use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geocast_core::config::AppConfig;
use geocast_core::network::Network;

fn bench_network_rounds(c: &mut Criterion) {
    let mut config = AppConfig::default();
    config.world.node_count = 500;
    config.world.width = 200.0;
    config.world.height = 200.0;
    config.world.seed = Some(42);
    config.world.deterministic = true;
    config.report.snapshot_interval = 0;

    c.bench_function("network_round_500_nodes", |b| {
        let mut network = Network::new(config.clone()).expect("valid config");
        b.iter(|| black_box(network.step()))
    });
}

criterion_group!(benches, bench_network_rounds);
criterion_main!(benches);
