use super::message::{HistoryEntry, MessageKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Deduplicated set of received messages plus their append-only history.
///
/// Mutation goes through `StoreLogic::absorb` in `geocast_core`, which keeps
/// `received` and `history` in lockstep.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageStore {
    pub received: HashSet<MessageKey>,
    pub history: Vec<HistoryEntry>,
}

impl MessageStore {
    pub fn contains(&self, key: &MessageKey) -> bool {
        self.received.contains(key)
    }

    pub fn len(&self) -> usize {
        self.received.len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.is_empty()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}
