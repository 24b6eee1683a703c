//! Simulation event log.

use crate::snapshot::NetworkSnapshot;
use geocast_data::{MessageKey, NodeId};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event")]
pub enum NetworkEvent {
    SourceActivated {
        node: NodeId,
        key: MessageKey,
        radius: f64,
        round: u64,
        time: f64,
    },
    SourceRetired {
        node: NodeId,
        round: u64,
        time: f64,
    },
    MessageDelivered {
        node: NodeId,
        key: MessageKey,
        round: u64,
        time: f64,
    },
    Snapshot {
        snapshot: NetworkSnapshot,
    },
}

impl NetworkEvent {
    pub fn round(&self) -> u64 {
        match self {
            NetworkEvent::SourceActivated { round, .. }
            | NetworkEvent::SourceRetired { round, .. }
            | NetworkEvent::MessageDelivered { round, .. } => *round,
            NetworkEvent::Snapshot { snapshot } => snapshot.round,
        }
    }
}

/// Append-only, in-memory event log.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<NetworkEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: NetworkEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkEvent> {
        self.events.iter()
    }

    /// Nodes that registered `key`, in delivery order.
    pub fn deliveries_of(&self, key: &MessageKey) -> Vec<NodeId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                NetworkEvent::MessageDelivered { node, key: k, .. } if k == key => Some(*node),
                _ => None,
            })
            .collect()
    }

    /// Activation events, one per source episode.
    pub fn activations(&self) -> impl Iterator<Item = (NodeId, MessageKey, f64, u64)> + '_ {
        self.events.iter().filter_map(|e| match e {
            NetworkEvent::SourceActivated {
                node,
                key,
                radius,
                round,
                ..
            } => Some((*node, *key, *radius, *round)),
            _ => None,
        })
    }

    /// One JSON object per line.
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}
