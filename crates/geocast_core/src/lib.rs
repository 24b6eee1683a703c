//! # Geocast Core
//!
//! Field-calculus geocast dissemination on a dynamic 3-D network.
//!
//! This crate contains the protocol and the round-driven simulator around it:
//! - Gradient-cast, single- and multi-source, with per-source radius cutoff
//! - The source-role state machine (activation, active window, cooldown)
//! - Per-node message store and relay bookkeeping
//! - The per-node round function and the network loop that drives it
//! - Configuration, neighbor discovery, mobility, metrics and logging
//!
//! ## Architecture
//!
//! Every node evaluates the same round function against its own state and
//! the one-round-old exports of its neighbors:
//! - **Local state only**: `NodeState` is mutated by its owner alone
//! - **Neighbor field**: exports are swapped in after all nodes finish a round
//! - **Parallel rounds**: Rayon evaluates nodes concurrently; no locks needed
//! - **Deterministic simulation**: per-(round, node) seeded ChaCha streams
//!
//! ## Example
//!
//! ```
//! use geocast_core::config::AppConfig;
//! use geocast_core::network::Network;
//! use geocast_data::Position;
//!
//! let mut config = AppConfig::default();
//! config.world.seed = Some(7);
//! config.source.activation_probability = 0.0;
//!
//! let positions = vec![Position::new(0.0, 0.0, 0.0), Position::new(7.0, 0.0, 0.0)];
//! let mut network = Network::with_positions(config, positions).unwrap();
//! let summary = network.step();
//! assert_eq!(summary.round, 1);
//! assert_eq!(network.adjacency[0], vec![1]);
//! ```

/// Configuration management for simulation parameters
pub mod config;
/// Per-node round function (the dissemination driver)
pub mod driver;
/// Single- and multi-source gradient-cast
pub mod gradient;
/// Simulation event log
pub mod history;
/// Distance between node positions
pub mod metric;
/// Performance metrics collection and logging
pub mod metrics;
/// Node placement and random-walk movement
pub mod mobility;
/// Round-synchronous network simulation loop
pub mod network;
/// Relay record derivation, re-broadcast and merge
pub mod relay;
/// Source-role state machine
pub mod role;
/// Network snapshots for reporting
pub mod snapshot;
/// 3-D spatial hashing for neighbor discovery
pub mod spatial_hash;
/// Deduplicating per-node message store
pub mod store;

pub use driver::{round, Neighbor, Report, RoundContext, RoundOutput};
pub use gradient::{cutoff_combine, gradient_cast, multi_gradient_cast, NeighborField};
pub use metric::{Euclidean, Metric};
pub use metrics::{init_logging, Metrics};
pub use network::{DeliveryRecord, Network, RoundSummary};
pub use role::{RoleLogic, RoleTransition};
pub use store::{Incoming, StoreLogic};
