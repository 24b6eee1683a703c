//! Node placement and movement. Environment-side glue: the protocol only
//! ever sees the resulting positions.

use crate::config::WorldConfig;
use geocast_data::Position;
use rand::Rng;

/// Axis-aligned box nodes live in, anchored at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Bounds {
    pub fn from_world(world: &WorldConfig) -> Self {
        Self {
            width: world.width,
            height: world.height,
            depth: world.depth,
        }
    }

    pub fn clamp(&self, p: Position) -> Position {
        Position::new(
            p.x.clamp(0.0, self.width),
            p.y.clamp(0.0, self.height),
            p.z.clamp(0.0, self.depth),
        )
    }
}

fn sample_axis<R: Rng>(rng: &mut R, extent: f64) -> f64 {
    if extent > 0.0 {
        rng.gen_range(0.0..extent)
    } else {
        0.0
    }
}

/// Uniformly random points inside `bounds`.
pub fn scatter<R: Rng>(count: usize, bounds: &Bounds, rng: &mut R) -> Vec<Position> {
    (0..count)
        .map(|_| {
            Position::new(
                sample_axis(rng, bounds.width),
                sample_axis(rng, bounds.height),
                sample_axis(rng, bounds.depth),
            )
        })
        .collect()
}

/// Moves every node by an independent uniform step of at most `max_step`
/// per axis, staying inside `bounds`.
pub fn random_walk<R: Rng>(positions: &mut [Position], bounds: &Bounds, max_step: f64, rng: &mut R) {
    if max_step <= 0.0 || !max_step.is_finite() {
        return;
    }
    for p in positions.iter_mut() {
        let moved = Position::new(
            p.x + rng.gen_range(-max_step..=max_step),
            p.y + rng.gen_range(-max_step..=max_step),
            p.z + rng.gen_range(-max_step..=max_step),
        );
        *p = bounds.clamp(moved);
    }
}
