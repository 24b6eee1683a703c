//! # Geocast Data
//!
//! Plain data model shared by the geocast simulation crates.
//!
//! Everything here is inert: no randomness, no neighbor access, no logging.
//! Behaviour lives in `geocast_core`.

pub mod data;

pub use data::message::{
    GradientResult, HistoryEntry, MessageKey, RelayEntry, RelayTable, SourceDistance,
    SourcePayload,
};
pub use data::node::{NodeExport, NodeId, NodeState, Position, RoleState, SourceRole};
pub use data::store::MessageStore;
