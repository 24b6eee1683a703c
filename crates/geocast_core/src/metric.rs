//! Distance between node positions.

use geocast_data::Position;

/// Non-negative distance between two positions.
pub trait Metric: Send + Sync {
    fn distance(&self, a: &Position, b: &Position) -> f64;
}

/// Straight-line distance in 3-D.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl Metric for Euclidean {
    #[inline]
    fn distance(&self, a: &Position, b: &Position) -> f64 {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        let dz = a.z - b.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
