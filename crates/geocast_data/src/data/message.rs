use super::node::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emission counter carried by the bottom payload.
pub const NO_EMISSION: i64 = -1;

/// A message as emitted by a source for one source episode.
///
/// `budget` is the radius the source declared when the episode began. The
/// bottom value (`budget = +inf`, empty content, emission `-1`) stands for
/// "no message" and is never stored or forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePayload {
    pub origin: NodeId,
    pub budget: f64,
    pub content: String,
    pub emission: i64,
}

impl SourcePayload {
    pub fn new(origin: NodeId, budget: f64, content: impl Into<String>, emission: i64) -> Self {
        Self {
            origin,
            budget,
            content: content.into(),
            emission,
        }
    }

    /// The "no message" value as seen from `local`.
    pub fn bottom(local: NodeId) -> Self {
        Self {
            origin: local,
            budget: f64::INFINITY,
            content: String::new(),
            emission: NO_EMISSION,
        }
    }

    #[inline]
    pub fn is_bottom(&self) -> bool {
        self.emission <= 0
    }

    pub fn key(&self) -> MessageKey {
        MessageKey::new(self.origin, self.emission)
    }
}

/// Value of the single-source gradient field at one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientResult {
    /// Nearest relevant source, or the local node when nothing reaches it.
    pub source: NodeId,
    /// Accumulated metric distance to `source`.
    pub distance: f64,
    pub payload: SourcePayload,
}

impl GradientResult {
    pub fn at_source(source: NodeId, payload: SourcePayload) -> Self {
        Self {
            source,
            distance: 0.0,
            payload,
        }
    }

    pub fn bottom(local: NodeId) -> Self {
        Self {
            source: local,
            distance: f64::INFINITY,
            payload: SourcePayload::bottom(local),
        }
    }

    #[inline]
    pub fn is_bottom(&self) -> bool {
        self.payload.is_bottom() || !self.distance.is_finite()
    }
}

/// Globally unique identity of one message instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageKey {
    pub sender: NodeId,
    pub emission: i64,
}

impl MessageKey {
    pub fn new(sender: NodeId, emission: i64) -> Self {
        Self { sender, emission }
    }

    /// Emission counters start at 1; anything else is a placeholder.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.emission > 0
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.sender, self.emission)
    }
}

/// Relay-tracking record for one message as seen at one node.
///
/// `to` is the origin the record is about, `from` the neighbor that relayed it
/// here and `traveled` the accumulated metric distance (never a hop count).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceDistance {
    pub to: NodeId,
    pub from: NodeId,
    pub allowed_radius: f64,
    pub traveled: f64,
    pub valid: bool,
}

impl SourceDistance {
    /// Builds a record; `valid` only survives while `traveled <= allowed_radius`.
    pub fn new(to: NodeId, from: NodeId, allowed_radius: f64, traveled: f64, valid: bool) -> Self {
        Self {
            to,
            from,
            allowed_radius,
            traveled,
            valid: valid && traveled.is_finite() && traveled <= allowed_radius,
        }
    }

    /// The record as it looks one hop further, relayed by `via`.
    ///
    /// Once invalid a record stays invalid.
    pub fn relayed(&self, via: NodeId, hop: f64) -> Self {
        Self::new(
            self.to,
            via,
            self.allowed_radius,
            self.traveled + hop,
            self.valid,
        )
    }

    pub fn is_admissible_for(&self, key: &MessageKey) -> bool {
        self.valid && self.traveled <= self.allowed_radius && self.to == key.sender
    }
}

/// Everything a node knows about one message instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RelayEntry {
    pub content: String,
    pub routes: Vec<SourceDistance>,
}

impl RelayEntry {
    pub fn new(content: impl Into<String>, routes: Vec<SourceDistance>) -> Self {
        Self {
            content: content.into(),
            routes,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.routes.iter().all(|r| !r.valid)
    }
}

/// Per-node multi-source field value, keyed by message identity.
pub type RelayTable = BTreeMap<MessageKey, RelayEntry>;

/// One line of a node's ordered message history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub key: MessageKey,
    pub content: String,
    /// Simulation time (seconds) of first reception.
    pub received_at: f64,
}
