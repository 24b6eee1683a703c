//! # Geocast IO
//!
//! Persistence layer for geocast simulation runs.
//!
//! This crate provides:
//! - A typed error for storage failures
//! - JSON serialization helpers
//! - Run reports and their plain or gzip-compressed storage
//! - Event log export as JSON lines

/// Storage error type and result alias
pub mod error;
/// Saving and loading run reports and event logs
pub mod persistence;
/// End-of-run summary of a simulation
pub mod report;
/// JSON helpers
pub mod serialization;

pub use error::{IoError, Result};
pub use persistence::{load_report, save_events, save_report};
pub use report::{NodeSummary, RunReport};
pub use serialization::{from_json, to_json_pretty};
