//! Gradient-cast: self-stabilizing distance fields with a per-source cutoff.
//!
//! Both variants are pure functions of the local node's own data and the
//! one-round-old values of its neighbors. Nothing is cached between rounds,
//! so a field re-derives itself every round and heals after node movement or
//! source departure. Out-of-range never fails; it degrades to the bottom value.
//!
//! Healing needs every hop to be strictly positive: a stale value then grows
//! by at least the smallest hop each round until it passes its radius. The
//! driver floors hop distances at `WorldConfig::min_hop`.

use geocast_data::{
    GradientResult, MessageKey, NodeExport, NodeId, RelayEntry, RelayTable, SourceDistance,
    SourcePayload,
};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// One neighbor as seen from the local node during a round.
#[derive(Debug, Clone, Copy)]
pub struct NeighborField<'a> {
    pub id: NodeId,
    /// Metric distance from the local node to this neighbor.
    pub hop: f64,
    /// The neighbor's output from the previous round.
    pub export: &'a NodeExport,
}

/// Single-source gradient-cast.
///
/// Sources report themselves at distance 0 with their own `local` value.
/// Every other node takes the minimum-distance result of `combine` applied to
/// each neighbor as `combine(neighbor_distance_from_source, hop, neighbor)`,
/// or the bottom value when no neighbor contributes.
pub fn gradient_cast<'a, I, C>(
    local_id: NodeId,
    is_source: bool,
    local: SourcePayload,
    neighbors: I,
    combine: C,
) -> GradientResult
where
    I: IntoIterator<Item = (f64, &'a GradientResult)>,
    C: Fn(f64, f64, &GradientResult) -> GradientResult,
{
    if is_source && !local.is_bottom() {
        return GradientResult::at_source(local_id, local);
    }

    neighbors
        .into_iter()
        .map(|(hop, nbr)| combine(nbr.distance, hop, nbr))
        .filter(|candidate| !candidate.is_bottom())
        .min_by(closer)
        .unwrap_or_else(|| GradientResult::bottom(local_id))
}

/// Hard radius cutoff: propagate the neighbor's value while the accumulated
/// distance stays within the radius carried in its payload.
pub fn cutoff_combine(
    local_id: NodeId,
) -> impl Fn(f64, f64, &GradientResult) -> GradientResult {
    move |from_source, to_neighbor, nbr| {
        // A node never hears its own message back.
        if nbr.is_bottom() || nbr.source == local_id {
            return GradientResult::bottom(local_id);
        }
        let distance = from_source + to_neighbor;
        if distance.is_finite() && distance <= nbr.payload.budget {
            GradientResult {
                source: nbr.source,
                distance,
                payload: nbr.payload.clone(),
            }
        } else {
            GradientResult::bottom(local_id)
        }
    }
}

/// Total order on candidates: shorter distance first, then lower source id,
/// then the newer emission.
fn closer(a: &GradientResult, b: &GradientResult) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| b.payload.emission.cmp(&a.payload.emission))
}

/// Multi-source gradient-cast over per-message relay tables.
///
/// The result is the union of the local node's own emission (if any) and every
/// neighbor entry that survives one more hop: `traveled` grows by the hop
/// distance, `from` becomes the relaying neighbor, and routes that exceed their
/// own radius are discarded. Routes the local node relayed itself and messages
/// it originated are never taken back. Entries left without routes are dropped,
/// so a departed source falls out of the union once its routes stop being
/// refreshed or exceed the radius.
pub fn multi_gradient_cast<'a, I>(
    local_id: NodeId,
    own: Option<&SourcePayload>,
    neighbors: I,
) -> RelayTable
where
    I: IntoIterator<Item = (NodeId, f64, &'a RelayTable)>,
{
    let mut table = RelayTable::new();

    if let Some(payload) = own.filter(|p| !p.is_bottom()) {
        let route = SourceDistance::new(local_id, local_id, payload.budget, 0.0, true);
        table.insert(
            payload.key(),
            RelayEntry::new(payload.content.clone(), vec![route]),
        );
    }

    for (nbr_id, hop, relays) in neighbors {
        if !hop.is_finite() {
            continue;
        }
        for (key, entry) in relays {
            if !key.is_valid() || key.sender == local_id {
                continue;
            }
            for route in entry.routes.iter().filter(|r| r.valid && r.from != local_id) {
                let next = route.relayed(nbr_id, hop);
                if next.is_admissible_for(key) {
                    insert_route(&mut table, *key, &entry.content, next);
                }
            }
        }
    }

    table
}

/// Files `route` under `key`, keeping at most one route per relaying node
/// (the shortest).
pub(crate) fn insert_route(
    table: &mut RelayTable,
    key: MessageKey,
    content: &str,
    route: SourceDistance,
) {
    let entry = table
        .entry(key)
        .or_insert_with(|| RelayEntry::new(content, Vec::new()));
    match entry.routes.iter_mut().find(|r| r.from == route.from) {
        Some(existing) if route.traveled < existing.traveled => *existing = route,
        Some(_) => {}
        None => entry.routes.push(route),
    }
}

/// Origins currently present in a relay table.
pub fn active_sources(table: &RelayTable) -> BTreeSet<NodeId> {
    table
        .iter()
        .filter(|(_, entry)| !entry.is_exhausted())
        .map(|(key, _)| key.sender)
        .collect()
}
