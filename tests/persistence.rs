mod common;

use common::{eager_source, NetworkBuilder};
use geocast_lib::io::{load_report, save_events, save_report, IoError, RunReport};
use geocast_lib::model::history::NetworkEvent;
use std::path::PathBuf;

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("geocast-it-{}-{}", std::process::id(), name))
}

fn finished_run() -> (RunReport, geocast_lib::model::network::Network) {
    let mut net = NetworkBuilder::new()
        .with_range(8.0)
        .with_node(0.0, 0.0, 0.0)
        .with_node(6.0, 0.0, 0.0)
        .with_node(12.0, 0.0, 0.0)
        .with_config(|c| c.report.snapshot_interval = 2)
        .with_source(0, eager_source(10))
        .build();
    let summaries = net.run(6);
    (RunReport::from_network(&net, summaries), net)
}

#[test]
fn test_report_survives_gzip() {
    let (report, _) = finished_run();
    assert_eq!(report.total_deliveries(), 1);
    assert_eq!(report.deliveries.len(), 1);
    assert_eq!(report.deliveries[0].eligible, 1);

    let path = scratch("report.json.gz");
    save_report(&report, &path).unwrap();
    let loaded = load_report(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.run_id, report.run_id);
    assert_eq!(loaded.created_at, report.created_at);
    assert_eq!(loaded.summaries, report.summaries);
    assert_eq!(loaded.deliveries, report.deliveries);
    assert_eq!(loaded.nodes, report.nodes);
    assert_eq!(loaded.final_snapshot.received, report.final_snapshot.received);
}

#[test]
fn test_event_log_is_json_lines() {
    let (_, net) = finished_run();
    let path = scratch("events.jsonl");
    save_events(&net.events, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let events: Vec<NetworkEvent> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), net.events.len());
    let not_snapshot = |e: &&NetworkEvent| !matches!(e, NetworkEvent::Snapshot { .. });
    assert!(events
        .iter()
        .filter(not_snapshot)
        .eq(net.events.iter().filter(not_snapshot)));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, NetworkEvent::Snapshot { .. }))
            .count(),
        3
    );
}

#[test]
fn test_corrupt_report_is_an_error() {
    let path = scratch("corrupt.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = load_report(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, IoError::Context { .. }));
}
