use anyhow::{Context, Result};
use clap::Parser;
use geocast_lib::io::{persistence, RunReport};
use geocast_lib::model::config::{AppConfig, ReportMode};
use geocast_lib::model::metrics::init_logging;
use geocast_lib::model::network::Network;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Number of rounds to simulate (overrides the config)
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Base RNG seed (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the run report here; a `.gz` suffix compresses it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the event log here as JSON lines
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// What each node reports per round
    #[arg(long, value_enum)]
    report_mode: Option<ReportModeArg>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ReportModeArg {
    Received,
    Senders,
}

impl From<ReportModeArg> for ReportMode {
    fn from(arg: ReportModeArg) -> Self {
        match arg {
            ReportModeArg::Received => ReportMode::Received,
            ReportModeArg::Senders => ReportMode::Senders,
        }
    }
}

fn setup_logging() {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        init_logging();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging();

    let mut config = AppConfig::load_or_default(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    if let Some(mode) = args.report_mode {
        config.report.mode = mode.into();
    }
    let rounds = args.rounds.unwrap_or(config.world.rounds);

    let mut network = Network::new(config)?;
    println!(
        "Simulating {} nodes for {} rounds (seed {})...",
        network.len(),
        rounds,
        network.seed()
    );

    let summaries = network.run(rounds);
    let report = RunReport::from_network(&network, summaries);

    let activations: usize = report.summaries.iter().map(|s| s.activations).sum();
    println!("Run {} finished in {:.2?}", report.run_id, network.metrics.elapsed());
    println!("  Emissions:        {}", activations);
    println!("  Deliveries:       {}", report.total_deliveries());
    println!(
        "  Mean received:    {:.2}",
        report.final_snapshot.mean_received()
    );
    match report.mean_coverage() {
        Some(coverage) => println!("  Mean coverage:    {:.1}%", coverage * 100.0),
        None => println!("  Mean coverage:    n/a"),
    }
    println!(
        "  Final sources:    {}",
        report.final_snapshot.active_sources.len()
    );
    println!(
        "  Still relayed:    {}",
        report.final_snapshot.relayed_origins.len()
    );

    if let Some(path) = &args.output {
        persistence::save_report(&report, path)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    if let Some(path) = &args.events {
        persistence::save_events(&network.events, path)
            .with_context(|| format!("writing events to {}", path.display()))?;
        println!("Event log written to {}", path.display());
    }

    Ok(())
}
