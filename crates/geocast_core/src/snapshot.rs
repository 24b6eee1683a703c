use geocast_data::NodeId;
use serde::{Deserialize, Serialize};

/// Per-round view of the whole network, taken by the simulator for reporting.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct NetworkSnapshot {
    pub round: u64,
    pub time: f64,
    pub active_sources: Vec<NodeId>,
    /// Distinct messages received, indexed by node.
    pub received: Vec<usize>,
    pub mean_degree: f64,
    /// Relay entries exported across all nodes.
    pub relay_entries: usize,
    /// Origins whose messages are still carried somewhere, including
    /// retired sources that have not drained yet.
    pub relayed_origins: Vec<NodeId>,
}

impl NetworkSnapshot {
    pub fn total_received(&self) -> usize {
        self.received.iter().sum()
    }

    pub fn mean_received(&self) -> f64 {
        if self.received.is_empty() {
            0.0
        } else {
            self.total_received() as f64 / self.received.len() as f64
        }
    }
}
