use super::message::{GradientResult, RelayTable, SourcePayload};
use super::store::MessageStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable node identity for the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// 3-D position supplied by the environment each round.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Phase of the source-role state machine. Times are simulation seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RoleState {
    #[default]
    Idle,
    Active {
        since: f64,
    },
    Cooldown {
        since: f64,
    },
}

/// Source-role bookkeeping of one node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceRole {
    pub state: RoleState,
    pub last_role_flip: f64,
    /// Last emission counter handed out; 0 before the first episode.
    pub emission_counter: i64,
    pub current_message: Option<SourcePayload>,
    /// Time of the last random activation draw.
    pub last_attempt: Option<f64>,
}

impl SourceRole {
    #[inline]
    pub fn is_source(&self) -> bool {
        matches!(self.state, RoleState::Active { .. })
    }

    pub fn source_since(&self) -> Option<f64> {
        match self.state {
            RoleState::Active { since } => Some(since),
            _ => None,
        }
    }
}

/// Persistent state owned by exactly one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub id: NodeId,
    pub role: SourceRole,
    pub store: MessageStore,
    /// Senders visible this round, keyed by origin.
    pub senders: BTreeMap<NodeId, SourcePayload>,
}

impl NodeState {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            role: SourceRole::default(),
            store: MessageStore::default(),
            senders: BTreeMap::new(),
        }
    }
}

/// What a node publishes to its neighbors for the next round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    pub gradient: GradientResult,
    pub relays: RelayTable,
}

impl NodeExport {
    /// Export of a node that has not evaluated a round yet.
    pub fn initial(id: NodeId) -> Self {
        Self {
            gradient: GradientResult::bottom(id),
            relays: RelayTable::new(),
        }
    }
}
