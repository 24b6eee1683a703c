//! End-of-run report.

use chrono::{DateTime, Utc};
use geocast_core::{DeliveryRecord, Metric, Network, RoundSummary};
use geocast_core::snapshot::NetworkSnapshot;
use geocast_data::{HistoryEntry, NodeId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NodeSummary {
    pub id: NodeId,
    pub received: usize,
    pub history: Vec<HistoryEntry>,
}

/// Everything a finished run leaves behind, ready to be written to disk.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// SHA-256 of the configuration the run used.
    pub config_fingerprint: String,
    pub seed: u64,
    pub rounds: u64,
    pub node_count: usize,
    pub summaries: Vec<RoundSummary>,
    pub deliveries: Vec<DeliveryRecord>,
    pub final_snapshot: NetworkSnapshot,
    pub nodes: Vec<NodeSummary>,
}

impl RunReport {
    pub fn from_network<M: Metric>(network: &Network<M>, summaries: Vec<RoundSummary>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            config_fingerprint: network.config.fingerprint(),
            seed: network.seed(),
            rounds: network.round,
            node_count: network.len(),
            summaries,
            deliveries: network.delivery_report(),
            final_snapshot: network.snapshot(),
            nodes: network
                .nodes
                .iter()
                .map(|n| NodeSummary {
                    id: n.id,
                    received: n.store.len(),
                    history: n.store.history().to_vec(),
                })
                .collect(),
        }
    }

    pub fn total_deliveries(&self) -> usize {
        self.nodes.iter().map(|n| n.received).sum()
    }

    /// Mean coverage over emitted messages, `None` before the first emission.
    pub fn mean_coverage(&self) -> Option<f64> {
        if self.deliveries.is_empty() {
            return None;
        }
        let sum: f64 = self.deliveries.iter().map(DeliveryRecord::coverage).sum();
        Some(sum / self.deliveries.len() as f64)
    }
}
