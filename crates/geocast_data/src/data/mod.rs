//! Core data structures for the geocast simulation.

pub mod message;
pub mod node;
pub mod store;
