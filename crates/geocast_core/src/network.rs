//! Round-synchronous simulation loop.
//!
//! Holds one `NodeState`, one position and one published export per node.
//! Every round the adjacency snapshot is rebuilt from positions, all nodes
//! evaluate the round function in parallel against the previous round's
//! exports, and only then are the new exports swapped in. Nodes never share
//! mutable state; isolation is structural.

use crate::config::{AppConfig, SourceConfig};
use crate::driver::{self, Neighbor, Report, RoundContext, RoundOutput};
use crate::gradient;
use crate::history::{EventLog, NetworkEvent};
use crate::metric::{Euclidean, Metric};
use crate::metrics::Metrics;
use crate::mobility::{self, Bounds};
use crate::role::RoleTransition;
use crate::snapshot::NetworkSnapshot;
use crate::spatial_hash::SpatialHash;
use geocast_data::{MessageKey, NodeExport, NodeId, NodeState, Position};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

/// Outcome of one simulated round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u64,
    pub time: f64,
    pub active_sources: usize,
    pub activations: usize,
    pub delivered: usize,
}

/// Reach of one emitted message, measured by the simulator after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub key: MessageKey,
    pub radius: f64,
    pub emitted_round: u64,
    /// Nodes within `radius` of the origin when the episode began.
    pub eligible: usize,
    /// Nodes that registered the message.
    pub reached: usize,
}

impl DeliveryRecord {
    pub fn coverage(&self) -> f64 {
        if self.eligible == 0 {
            1.0
        } else {
            self.reached as f64 / self.eligible as f64
        }
    }
}

pub struct Network<M: Metric = Euclidean> {
    pub config: AppConfig,
    pub round: u64,
    pub nodes: Vec<NodeState>,
    pub positions: Vec<Position>,
    /// Neighbor indices per node, rebuilt every round.
    pub adjacency: Vec<Vec<usize>>,
    /// Last value each node reported.
    pub reports: Vec<Report>,
    pub events: EventLog,
    pub metrics: Metrics,
    pub snapshots: Vec<NetworkSnapshot>,
    exports: Vec<NodeExport>,
    source_overrides: HashMap<NodeId, SourceConfig>,
    emissions: Vec<DeliveryRecord>,
    spatial_hash: SpatialHash,
    metric: M,
    base_seed: u64,
    rng: ChaCha8Rng,
}

impl Network<Euclidean> {
    /// Builds a network with `config.world.node_count` randomly placed nodes.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let base_seed = resolve_seed(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
        let positions = mobility::scatter(
            config.world.node_count,
            &Bounds::from_world(&config.world),
            &mut rng,
        );
        Self::assemble(config, positions, Euclidean, base_seed, rng)
    }

    /// Builds a network with one node per given position; node ids follow
    /// the order of `positions`.
    pub fn with_positions(config: AppConfig, positions: Vec<Position>) -> anyhow::Result<Self> {
        Self::with_metric(config, positions, Euclidean)
    }
}

impl<M: Metric> Network<M> {
    pub fn with_metric(
        mut config: AppConfig,
        positions: Vec<Position>,
        metric: M,
    ) -> anyhow::Result<Self> {
        config.world.node_count = positions.len();
        config.validate()?;
        anyhow::ensure!(
            positions.iter().all(Position::is_finite),
            "Node positions must be finite"
        );
        let base_seed = resolve_seed(&config);
        let rng = ChaCha8Rng::seed_from_u64(base_seed);
        Self::assemble(config, positions, metric, base_seed, rng)
    }

    fn assemble(
        config: AppConfig,
        positions: Vec<Position>,
        metric: M,
        base_seed: u64,
        rng: ChaCha8Rng,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            positions.len() <= u32::MAX as usize,
            "Too many nodes for 32-bit ids"
        );
        let n = positions.len();
        let nodes: Vec<NodeState> = (0..n).map(|i| NodeState::new(NodeId(i as u32))).collect();
        let exports = nodes.iter().map(|s| NodeExport::initial(s.id)).collect();
        let spatial_hash = SpatialHash::new(config.world.communication_range);

        tracing::info!(
            nodes = n,
            seed = base_seed,
            fingerprint = %config.fingerprint(),
            "Network created"
        );

        Ok(Self {
            round: 0,
            nodes,
            positions,
            adjacency: vec![Vec::new(); n],
            reports: vec![Report::Received(0); n],
            events: EventLog::default(),
            metrics: Metrics::new(),
            snapshots: Vec::new(),
            exports,
            source_overrides: HashMap::new(),
            emissions: Vec::new(),
            spatial_hash,
            metric,
            base_seed,
            rng,
            config,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn seed(&self) -> u64 {
        self.base_seed
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeState> {
        self.nodes.get(id.0 as usize)
    }

    /// What `id` published for its neighbors at the end of the last round.
    pub fn export(&self, id: NodeId) -> Option<&NodeExport> {
        self.exports.get(id.0 as usize)
    }

    /// Gives one node its own source-role parameters.
    pub fn set_source_config(&mut self, id: NodeId, source: SourceConfig) {
        self.source_overrides.insert(id, source);
    }

    /// Moves a node; takes effect from the next round.
    pub fn set_position(&mut self, id: NodeId, position: Position) {
        if let Some(p) = self.positions.get_mut(id.0 as usize) {
            *p = position;
        }
    }

    /// Current simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.round as f64 * self.config.world.round_period_secs
    }

    fn rebuild_adjacency(&mut self) {
        self.spatial_hash.build(&self.positions);
        let range = self.config.world.communication_range;
        let positions = &self.positions;
        let hash = &self.spatial_hash;
        let metric = &self.metric;

        self.adjacency = (0..positions.len())
            .into_par_iter()
            .map(|i| {
                let mut candidates = Vec::new();
                hash.query_into(&positions[i], range, &mut candidates);
                let mut near: Vec<usize> = candidates
                    .into_iter()
                    .filter(|&j| j != i && metric.distance(&positions[i], &positions[j]) <= range)
                    .collect();
                near.sort_unstable();
                near
            })
            .collect();
    }

    /// Advances the simulation by one round.
    pub fn step(&mut self) -> RoundSummary {
        let started = Instant::now();
        self.round += 1;
        let round = self.round;
        let now = self.time();

        if self.config.mobility.enabled {
            let max_step = self.config.mobility.max_speed * self.config.world.round_period_secs;
            mobility::random_walk(
                &mut self.positions,
                &Bounds::from_world(&self.config.world),
                max_step,
                &mut self.rng,
            );
        }
        self.rebuild_adjacency();

        let outputs: Vec<RoundOutput> = {
            let exports = &self.exports;
            let positions = &self.positions;
            let adjacency = &self.adjacency;
            let metric = &self.metric;
            let overrides = &self.source_overrides;
            let default_source = &self.config.source;
            let report_mode = self.config.report.mode;
            let min_hop = self.config.world.min_hop;
            let base_seed = self.base_seed;

            self.nodes
                .par_iter_mut()
                .enumerate()
                .map(|(idx, state)| {
                    let neighbors: Vec<Neighbor<'_>> = adjacency[idx]
                        .iter()
                        .map(|&j| Neighbor {
                            id: NodeId(j as u32),
                            position: positions[j],
                            export: &exports[j],
                        })
                        .collect();
                    let ctx = RoundContext {
                        now,
                        position: positions[idx],
                        neighbors: &neighbors,
                        metric,
                        min_hop,
                        source: overrides.get(&state.id).unwrap_or(default_source),
                        report_mode,
                    };
                    let mut rng = ChaCha8Rng::seed_from_u64(node_seed(base_seed, round, state.id));
                    driver::round(state, &ctx, &mut rng)
                })
                .collect()
        };

        let mut delivered = 0;
        let mut activations = 0;
        for (idx, out) in outputs.into_iter().enumerate() {
            let id = NodeId(idx as u32);
            match &out.transition {
                RoleTransition::Activated(payload) => {
                    activations += 1;
                    self.metrics.increment_counter("activations");
                    tracing::debug!(node = %id, key = %payload.key(), radius = payload.budget, "source activated");
                    self.events.push(NetworkEvent::SourceActivated {
                        node: id,
                        key: payload.key(),
                        radius: payload.budget,
                        round,
                        time: now,
                    });
                    let origin = self.positions[idx];
                    let eligible = self
                        .positions
                        .iter()
                        .enumerate()
                        .filter(|&(j, p)| j != idx && self.metric.distance(&origin, p) <= payload.budget)
                        .count();
                    self.emissions.push(DeliveryRecord {
                        key: payload.key(),
                        radius: payload.budget,
                        emitted_round: round,
                        eligible,
                        reached: 0,
                    });
                }
                RoleTransition::Retired => {
                    self.metrics.increment_counter("retirements");
                    self.events.push(NetworkEvent::SourceRetired {
                        node: id,
                        round,
                        time: now,
                    });
                }
                RoleTransition::Unchanged | RoleTransition::Rearmed => {}
            }

            delivered += out.accepted.len();
            for entry in out.accepted {
                self.events.push(NetworkEvent::MessageDelivered {
                    node: id,
                    key: entry.key,
                    round,
                    time: now,
                });
            }
            self.exports[idx] = out.export;
            self.reports[idx] = out.report;
        }

        let active_sources = self.nodes.iter().filter(|s| s.role.is_source()).count();
        let interval = self.config.report.snapshot_interval;
        if interval > 0 && round % interval == 0 {
            let snapshot = self.snapshot();
            self.events.push(NetworkEvent::Snapshot {
                snapshot: snapshot.clone(),
            });
            self.snapshots.push(snapshot);
        }

        self.metrics
            .record_round(started.elapsed(), self.nodes.len(), active_sources, delivered);

        RoundSummary {
            round,
            time: now,
            active_sources,
            activations,
            delivered,
        }
    }

    /// Runs `rounds` rounds and returns their summaries.
    pub fn run(&mut self, rounds: u64) -> Vec<RoundSummary> {
        (0..rounds).map(|_| self.step()).collect()
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        let degree_sum: usize = self.adjacency.iter().map(Vec::len).sum();
        NetworkSnapshot {
            round: self.round,
            time: self.time(),
            active_sources: self
                .nodes
                .iter()
                .filter(|s| s.role.is_source())
                .map(|s| s.id)
                .collect(),
            received: self.nodes.iter().map(|s| s.store.len()).collect(),
            mean_degree: if self.nodes.is_empty() {
                0.0
            } else {
                degree_sum as f64 / self.nodes.len() as f64
            },
            relay_entries: self.exports.iter().map(|e| e.relays.len()).sum(),
            relayed_origins: self
                .exports
                .iter()
                .flat_map(|e| gradient::active_sources(&e.relays))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    /// Reach of every message emitted so far.
    pub fn delivery_report(&self) -> Vec<DeliveryRecord> {
        self.emissions
            .iter()
            .map(|record| DeliveryRecord {
                reached: self
                    .nodes
                    .iter()
                    .filter(|s| s.store.contains(&record.key))
                    .count(),
                ..record.clone()
            })
            .collect()
    }
}

fn resolve_seed(config: &AppConfig) -> u64 {
    match config.world.seed {
        Some(seed) => seed,
        None if config.world.deterministic => 0,
        None => rand::random(),
    }
}

/// Independent RNG stream per (round, node).
fn node_seed(base: u64, round: u64, id: NodeId) -> u64 {
    base.wrapping_add(round.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(u64::from(id.0).wrapping_mul(0xBF58_476D_1CE4_E5B9))
        .wrapping_add(0x5EED)
}
