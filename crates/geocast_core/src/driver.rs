//! One round of the geocast program at one node.
//!
//! The round reads only the node's own state and the previous-round exports
//! of its current neighbors, mutates the node's state in place and returns the
//! export its neighbors will read next round.

use crate::config::{ReportMode, SourceConfig};
use crate::gradient::{cutoff_combine, gradient_cast, NeighborField};
use crate::metric::Metric;
use crate::relay;
use crate::role::{RoleLogic, RoleTransition};
use crate::store::StoreLogic;
use geocast_data::{
    HistoryEntry, NodeExport, NodeId, NodeState, Position, RelayTable, SourcePayload,
};
use rand::Rng;
use std::collections::BTreeMap;

/// A current neighbor and what it exported last round.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub id: NodeId,
    pub position: Position,
    pub export: &'a NodeExport,
}

/// Environment snapshot handed to a node for one round.
pub struct RoundContext<'a, M: Metric> {
    /// Simulation time in seconds.
    pub now: f64,
    pub position: Position,
    pub neighbors: &'a [Neighbor<'a>],
    pub metric: &'a M,
    /// Floor applied to every hop distance.
    pub min_hop: f64,
    pub source: &'a SourceConfig,
    pub report_mode: ReportMode,
}

/// Summary value a round reports to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Distinct messages received so far.
    Received(usize),
    /// Senders currently visible, keyed by origin.
    Senders(BTreeMap<NodeId, SourcePayload>),
}

#[derive(Debug, Clone)]
pub struct RoundOutput {
    pub export: NodeExport,
    pub transition: RoleTransition,
    pub accepted: Vec<HistoryEntry>,
    pub report: Report,
}

/// Evaluates one round at one node.
///
/// Order: role decision, single-source gradient of intent to send, sender
/// table, neighbor-distance table and relay records, multi-hop re-broadcast
/// and merge, store, report.
pub fn round<M: Metric, R: Rng>(
    state: &mut NodeState,
    ctx: &RoundContext<'_, M>,
    rng: &mut R,
) -> RoundOutput {
    let id = state.id;

    // 1. role
    let transition = state.role.step(id, ctx.now, ctx.source, rng);
    let emitting = state.role.emitting().cloned();

    // 4 (shared). neighbor-distance table
    let hops: BTreeMap<NodeId, f64> = ctx
        .neighbors
        .iter()
        .map(|n| {
            let hop = ctx.metric.distance(&ctx.position, &n.position);
            (n.id, floor_hop(hop, ctx.min_hop))
        })
        .collect();
    let fields: Vec<NeighborField<'_>> = ctx
        .neighbors
        .iter()
        .map(|n| NeighborField {
            id: n.id,
            hop: hops.get(&n.id).copied().unwrap_or(f64::INFINITY),
            export: n.export,
        })
        .collect();

    // 2. intent to send
    let gradient = gradient_cast(
        id,
        emitting.is_some(),
        emitting
            .clone()
            .unwrap_or_else(|| SourcePayload::bottom(id)),
        fields.iter().map(|f| (f.hop, &f.export.gradient)),
        cutoff_combine(id),
    );

    // 3. sender table
    let senders = relay::collect_senders(id, &gradient, &fields);

    // 4. relay records from direct announcements
    let mut working: RelayTable = relay::save_new_messages(id, &senders, &fields);

    // 5. multi-hop re-broadcast
    let relayed = relay::spread_new_messages(id, emitting.as_ref(), &fields);
    relay::merge(&mut working, relayed);

    // 6. store
    let accepted = state
        .store
        .absorb(relay::incoming(id, &working), ctx.now);
    for entry in &accepted {
        tracing::debug!(node = %id, key = %entry.key, "message accepted");
    }

    // 7. report
    state.senders = senders;
    let report = match ctx.report_mode {
        ReportMode::Received => Report::Received(state.store.len()),
        ReportMode::Senders => Report::Senders(state.senders.clone()),
    };

    RoundOutput {
        export: NodeExport {
            gradient,
            relays: working,
        },
        transition,
        accepted,
        report,
    }
}

/// Hop distance with a positive floor, so no field value crosses a hop for
/// free. NaN stays NaN and is rejected downstream as non-finite.
fn floor_hop(hop: f64, min_hop: f64) -> f64 {
    if hop.is_nan() {
        hop
    } else {
        hop.max(min_hop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Euclidean;
    use geocast_data::{GradientResult, MessageKey};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn never() -> SourceConfig {
        SourceConfig {
            activation_probability: 0.0,
            ..SourceConfig::default()
        }
    }

    fn source_export(origin: u32, budget: f64) -> NodeExport {
        let payload = SourcePayload::new(NodeId(origin), budget, "hi", 1);
        let mut relays = RelayTable::new();
        relays.insert(
            payload.key(),
            geocast_data::RelayEntry::new(
                "hi",
                vec![geocast_data::SourceDistance::new(
                    NodeId(origin),
                    NodeId(origin),
                    budget,
                    0.0,
                    true,
                )],
            ),
        );
        NodeExport {
            gradient: GradientResult::at_source(NodeId(origin), payload),
            relays,
        }
    }

    fn run_once(distance: f64, mode: ReportMode) -> (NodeState, RoundOutput) {
        let export = source_export(0, 10.0);
        let neighbors = [Neighbor {
            id: NodeId(0),
            position: Position::new(0.0, 0.0, 0.0),
            export: &export,
        }];
        let cfg = never();
        let ctx = RoundContext {
            now: 1.0,
            position: Position::new(distance, 0.0, 0.0),
            neighbors: &neighbors,
            metric: &Euclidean,
            min_hop: 1.0,
            source: &cfg,
            report_mode: mode,
        };
        let mut state = NodeState::new(NodeId(1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = round(&mut state, &ctx, &mut rng);
        (state, out)
    }

    #[test]
    fn test_round_within_radius_delivers() {
        let (state, out) = run_once(7.0, ReportMode::Received);
        assert_eq!(out.export.gradient.source, NodeId(0));
        assert_eq!(out.export.gradient.distance, 7.0);
        assert!(state.store.contains(&MessageKey::new(NodeId(0), 1)));
        assert_eq!(out.accepted.len(), 1);
        assert_eq!(out.report, Report::Received(1));
    }

    #[test]
    fn test_round_outside_radius_is_silent() {
        let (state, out) = run_once(15.0, ReportMode::Received);
        assert!(out.export.gradient.is_bottom());
        assert!(out.export.relays.is_empty());
        assert!(state.store.is_empty());
    }

    #[test]
    fn test_colocated_neighbor_costs_min_hop() {
        let (state, out) = run_once(0.0, ReportMode::Received);
        assert_eq!(out.export.gradient.distance, 1.0);
        let route = out.export.relays[&MessageKey::new(NodeId(0), 1)].routes[0];
        assert_eq!(route.traveled, 1.0);
        assert_eq!(state.store.len(), 1);
    }

    #[test]
    fn test_sender_report_mode() {
        let (_, out) = run_once(7.0, ReportMode::Senders);
        let Report::Senders(senders) = out.report else {
            panic!("expected sender map");
        };
        assert_eq!(senders.keys().copied().collect::<Vec<_>>(), vec![NodeId(0)]);
    }

    #[test]
    fn test_lonely_node_exports_bottom() {
        let cfg = never();
        let ctx = RoundContext {
            now: 0.0,
            position: Position::default(),
            neighbors: &[],
            metric: &Euclidean,
            min_hop: 1.0,
            source: &cfg,
            report_mode: ReportMode::Received,
        };
        let mut state = NodeState::new(NodeId(9));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let out = round(&mut state, &ctx, &mut rng);
        assert_eq!(out.export, NodeExport::initial(NodeId(9)));
    }
}
