//! Geocast dissemination over a round-synchronous aggregate simulation.
//!
//! The protocol lives in `geocast_core` and `geocast_data`; persistence in
//! `geocast_io`. This crate re-exports them under one `model` facade and
//! hosts the command-line binaries.

pub mod model;

pub use geocast_io as io;
