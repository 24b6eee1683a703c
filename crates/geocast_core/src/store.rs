//! Per-node message bookkeeping.

use geocast_data::{HistoryEntry, MessageKey, MessageStore};

/// A message offered to a node's store this round.
#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub key: MessageKey,
    pub content: String,
    /// Whether at least one admissible relay delivered it.
    pub valid: bool,
}

impl Incoming {
    pub fn new(key: MessageKey, content: impl Into<String>, valid: bool) -> Self {
        Self {
            key,
            content: content.into(),
            valid,
        }
    }
}

pub trait StoreLogic {
    /// Accepts every valid, not-yet-seen message in iteration order and
    /// returns the newly accepted ones.
    ///
    /// A key enters `received` at most once and `history` only grows by keys
    /// that were absent at append time. Placeholders (emission `<= 0`) are
    /// never stored.
    fn absorb<I>(&mut self, incoming: I, now: f64) -> Vec<HistoryEntry>
    where
        I: IntoIterator<Item = Incoming>;
}

impl StoreLogic for MessageStore {
    fn absorb<I>(&mut self, incoming: I, now: f64) -> Vec<HistoryEntry>
    where
        I: IntoIterator<Item = Incoming>,
    {
        let mut accepted = Vec::new();
        for item in incoming {
            if !item.valid || !item.key.is_valid() {
                continue;
            }
            if !self.received.insert(item.key) {
                continue;
            }
            let entry = HistoryEntry {
                key: item.key,
                content: item.content,
                received_at: now,
            };
            self.history.push(entry.clone());
            accepted.push(entry);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocast_data::NodeId;

    fn key(sender: u32, emission: i64) -> MessageKey {
        MessageKey::new(NodeId(sender), emission)
    }

    #[test]
    fn test_absorb_dedups_within_and_across_rounds() {
        let mut store = MessageStore::default();
        let first = store.absorb(
            [
                Incoming::new(key(1, 1), "a", true),
                Incoming::new(key(1, 1), "a", true),
            ],
            1.0,
        );
        assert_eq!(first.len(), 1);
        let again = store.absorb([Incoming::new(key(1, 1), "a", true)], 2.0);
        assert!(again.is_empty());
        assert_eq!(store.len(), 1);
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].received_at, 1.0);
    }

    #[test]
    fn test_absorb_rejects_placeholders_and_invalid() {
        let mut store = MessageStore::default();
        let accepted = store.absorb(
            [
                Incoming::new(key(1, 0), "", true),
                Incoming::new(key(1, -1), "", true),
                Incoming::new(key(2, 3), "x", false),
            ],
            0.0,
        );
        assert!(accepted.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_history_keeps_arrival_order() {
        let mut store = MessageStore::default();
        store.absorb([Incoming::new(key(5, 1), "first", true)], 1.0);
        store.absorb(
            [
                Incoming::new(key(5, 2), "second", true),
                Incoming::new(key(3, 1), "third", true),
            ],
            2.0,
        );
        let contents: Vec<&str> = store.history().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }
}
