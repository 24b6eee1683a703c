use clap::Parser;
use geocast_lib::model::data::{MessageKey, NodeId};
use geocast_lib::model::history::NetworkEvent;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "logs/events.jsonl")]
    events: String,

    #[arg(short, long, default_value = "report.md")]
    output: String,
}

struct MessageStats {
    origin: NodeId,
    radius: f64,
    emitted_round: u64,
    receivers: usize,
    /// Rounds between emission and the last delivery.
    settle_rounds: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Analyzing geocast event log...");

    let reader = BufReader::new(File::open(&args.events)?);
    let mut messages: BTreeMap<MessageKey, MessageStats> = BTreeMap::new();
    let mut retirements = 0;
    let mut skipped = 0;
    let mut last_round = 0;

    for line in reader.lines() {
        let line = line?;
        let Ok(event) = serde_json::from_str::<NetworkEvent>(&line) else {
            skipped += 1;
            continue;
        };
        last_round = last_round.max(event.round());
        match event {
            NetworkEvent::SourceActivated {
                node,
                key,
                radius,
                round,
                ..
            } => {
                messages.insert(
                    key,
                    MessageStats {
                        origin: node,
                        radius,
                        emitted_round: round,
                        receivers: 0,
                        settle_rounds: 0,
                    },
                );
            }
            NetworkEvent::MessageDelivered { key, round, .. } => {
                if let Some(stats) = messages.get_mut(&key) {
                    stats.receivers += 1;
                    stats.settle_rounds = stats
                        .settle_rounds
                        .max(round.saturating_sub(stats.emitted_round));
                }
            }
            NetworkEvent::SourceRetired { .. } => retirements += 1,
            NetworkEvent::Snapshot { .. } => {}
        }
    }

    let total_deliveries: usize = messages.values().map(|m| m.receivers).sum();
    let mean_reach = if messages.is_empty() {
        0.0
    } else {
        total_deliveries as f64 / messages.len() as f64
    };

    let report = format!(
        "# Geocast Dissemination Report\n\n\
        _Generated {}_\n\n\
        ## Summary\n\
        - **Rounds Logged**: {}\n\
        - **Messages Emitted**: {}\n\
        - **Source Retirements**: {}\n\
        - **Deliveries**: {}\n\
        - **Mean Receivers per Message**: {:.2}\n\n\
        ## Messages\n\n\
        | Key | Origin | Radius | Emitted | Receivers | Settled after |\n\
        |---|---|---|---|---|---|\n\
        {}",
        chrono::Utc::now().to_rfc3339(),
        last_round,
        messages.len(),
        retirements,
        total_deliveries,
        mean_reach,
        messages
            .iter()
            .map(|(key, m)| {
                format!(
                    "| {} | {} | {:.0} | {} | {} | {} |\n",
                    key, m.origin, m.radius, m.emitted_round, m.receivers, m.settle_rounds
                )
            })
            .collect::<Vec<_>>()
            .join("")
    );

    std::fs::write(&args.output, report)?;
    if skipped > 0 {
        println!("Skipped {skipped} unreadable lines");
    }
    println!("Report generated: {}", args.output);

    Ok(())
}
