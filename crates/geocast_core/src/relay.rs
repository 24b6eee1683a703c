//! Relay bookkeeping: turning gradient fields into admissible, deduplicated
//! per-message relay tables.

use crate::gradient::{insert_route, multi_gradient_cast, NeighborField};
use crate::store::Incoming;
use geocast_data::{GradientResult, NodeId, RelayTable, SourceDistance, SourcePayload};
use std::collections::BTreeMap;

/// Sender table: the local gradient result merged with the senders announced
/// directly by neighbors.
///
/// Bottom values and the local node's own messages are skipped. When one
/// origin shows up with different emissions the newest wins.
pub fn collect_senders(
    local_id: NodeId,
    gradient: &GradientResult,
    neighbors: &[NeighborField<'_>],
) -> BTreeMap<NodeId, SourcePayload> {
    let mut senders: BTreeMap<NodeId, SourcePayload> = BTreeMap::new();
    let candidates = neighbors
        .iter()
        .map(|n| &n.export.gradient)
        .chain(std::iter::once(gradient));

    for g in candidates {
        if g.is_bottom() || g.payload.origin == local_id || !g.payload.key().is_valid() {
            continue;
        }
        match senders.get(&g.payload.origin) {
            Some(known) if known.emission >= g.payload.emission => {}
            _ => {
                senders.insert(g.payload.origin, g.payload.clone());
            }
        }
    }
    senders
}

/// Builds relay records from the neighbors' gradient announcements and keeps
/// the admissible ones.
///
/// An announcement is valid when its origin is a known sender, it does not
/// originate from the local node, and the hop to the announcing neighbor is
/// finite. It is stored only when the record is valid, within its radius,
/// and filed under the key of its own origin.
pub fn save_new_messages(
    local_id: NodeId,
    senders: &BTreeMap<NodeId, SourcePayload>,
    neighbors: &[NeighborField<'_>],
) -> RelayTable {
    let mut table = RelayTable::new();
    for nbr in neighbors {
        let g = &nbr.export.gradient;
        if g.is_bottom() {
            continue;
        }
        let key = g.payload.key();
        if !key.is_valid() {
            continue;
        }

        let valid = senders.contains_key(&g.source) && g.source != local_id && nbr.hop.is_finite();
        let record = SourceDistance::new(
            g.source,
            nbr.id,
            g.payload.budget,
            g.distance + nbr.hop,
            valid,
        );
        if record.is_admissible_for(&key) {
            insert_route(&mut table, key, &g.payload.content, record);
        }
    }
    table
}

/// Multi-hop re-broadcast of every message the neighbors still carry, plus
/// the local node's own emission.
pub fn spread_new_messages(
    local_id: NodeId,
    own: Option<&SourcePayload>,
    neighbors: &[NeighborField<'_>],
) -> RelayTable {
    multi_gradient_cast(
        local_id,
        own,
        neighbors
            .iter()
            .map(|n| (n.id, n.hop, &n.export.relays)),
    )
}

/// Merges relayed entries into the working set.
///
/// An entry for a message not yet in the working set is taken whole. A
/// message already present is not skipped outright: a route from a relay the
/// working set already lists is the same delivery and is dropped, but routes
/// from other relays are appended. An entry whose only routes went stale can
/// therefore still be accepted through a valid route from a different relay.
pub fn merge(working: &mut RelayTable, relayed: RelayTable) {
    for (key, entry) in relayed {
        match working.get_mut(&key) {
            Some(existing) => {
                for route in entry.routes {
                    if !existing.routes.iter().any(|r| r.from == route.from) {
                        existing.routes.push(route);
                    }
                }
            }
            None => {
                if !entry.routes.is_empty() {
                    working.insert(key, entry);
                }
            }
        }
    }
}

/// Store offers for every message in the working set that the local node did
/// not originate.
pub fn incoming(local_id: NodeId, working: &RelayTable) -> Vec<Incoming> {
    working
        .iter()
        .filter(|(key, _)| key.sender != local_id)
        .map(|(key, entry)| {
            let valid = entry.routes.iter().any(|r| r.is_admissible_for(key));
            Incoming::new(*key, entry.content.clone(), valid)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocast_data::{MessageKey, NodeExport, RelayEntry};

    fn export_from(source: u32, distance: f64, budget: f64, emission: i64) -> NodeExport {
        NodeExport {
            gradient: GradientResult {
                source: NodeId(source),
                distance,
                payload: SourcePayload::new(NodeId(source), budget, "m", emission),
            },
            relays: RelayTable::new(),
        }
    }

    #[test]
    fn test_senders_prefer_newest_emission() {
        let old = export_from(1, 0.0, 10.0, 1);
        let new = export_from(1, 0.0, 10.0, 2);
        let fields = [
            NeighborField { id: NodeId(1), hop: 1.0, export: &old },
            NeighborField { id: NodeId(3), hop: 1.0, export: &new },
        ];
        let senders = collect_senders(NodeId(2), &GradientResult::bottom(NodeId(2)), &fields);
        assert_eq!(senders[&NodeId(1)].emission, 2);
    }

    #[test]
    fn test_unknown_sender_is_not_saved() {
        let exp = export_from(1, 0.0, 10.0, 1);
        let fields = [NeighborField { id: NodeId(1), hop: 2.0, export: &exp }];
        let table = save_new_messages(NodeId(2), &BTreeMap::new(), &fields);
        assert!(table.is_empty());
    }

    #[test]
    fn test_save_respects_radius() {
        let exp = export_from(1, 6.0, 10.0, 1);
        let near = [NeighborField { id: NodeId(4), hop: 4.0, export: &exp }];
        let far = [NeighborField { id: NodeId(4), hop: 4.5, export: &exp }];
        let senders = collect_senders(NodeId(2), &GradientResult::bottom(NodeId(2)), &near);

        let saved = save_new_messages(NodeId(2), &senders, &near);
        let route = saved[&MessageKey::new(NodeId(1), 1)].routes[0];
        assert_eq!(route.traveled, 10.0);
        assert_eq!(route.from, NodeId(4));

        assert!(save_new_messages(NodeId(2), &senders, &far).is_empty());
    }

    #[test]
    fn test_merge_skips_same_relay() {
        let key = MessageKey::new(NodeId(1), 1);
        let route = |from: u32, traveled: f64| {
            SourceDistance::new(NodeId(1), NodeId(from), 20.0, traveled, true)
        };
        let mut working = RelayTable::new();
        working.insert(key, RelayEntry::new("m", vec![route(5, 4.0)]));

        let mut relayed = RelayTable::new();
        relayed.insert(key, RelayEntry::new("m", vec![route(5, 3.0), route(6, 8.0)]));
        relayed.insert(MessageKey::new(NodeId(2), 1), RelayEntry::new("n", vec![]));
        merge(&mut working, relayed);

        assert_eq!(working.len(), 1);
        let froms: Vec<NodeId> = working[&key].routes.iter().map(|r| r.from).collect();
        assert_eq!(froms, vec![NodeId(5), NodeId(6)]);
        assert_eq!(working[&key].routes[0].traveled, 4.0);
    }

    #[test]
    fn test_merge_keeps_valid_route_from_other_relay() {
        let key = MessageKey::new(NodeId(1), 1);
        let mut working = RelayTable::new();
        working.insert(
            key,
            RelayEntry::new(
                "m",
                vec![SourceDistance::new(NodeId(1), NodeId(5), 20.0, 25.0, false)],
            ),
        );
        let mut relayed = RelayTable::new();
        relayed.insert(
            key,
            RelayEntry::new(
                "m",
                vec![SourceDistance::new(NodeId(1), NodeId(6), 20.0, 9.0, true)],
            ),
        );
        merge(&mut working, relayed);

        let offers = incoming(NodeId(3), &working);
        assert_eq!(offers.len(), 1);
        assert!(offers[0].valid);
    }

    #[test]
    fn test_incoming_excludes_own_messages() {
        let mut working = RelayTable::new();
        working.insert(
            MessageKey::new(NodeId(2), 1),
            RelayEntry::new(
                "own",
                vec![SourceDistance::new(NodeId(2), NodeId(2), 5.0, 0.0, true)],
            ),
        );
        working.insert(
            MessageKey::new(NodeId(1), 1),
            RelayEntry::new(
                "other",
                vec![SourceDistance::new(NodeId(1), NodeId(1), 5.0, 3.0, true)],
            ),
        );
        let offers = incoming(NodeId(2), &working);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].key.sender, NodeId(1));
        assert!(offers[0].valid);
    }
}
