use geocast_data::Position;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Upper bound on grid cells; coarser cells are used beyond it.
const MAX_CELLS: usize = 1 << 20;

#[derive(Clone, Debug)]
/// Spatial indexing structure for neighbor discovery on node positions.
///
/// Implements a 3-D uniform grid using offset-indexed node lists. The grid
/// covers the bounding box of the positions it was built from, so nodes
/// placed outside the configured world are still indexed.
///
/// # Performance Characteristics
/// - Range queries: O(nodes in overlapped cells)
/// - Construction: O(node_count) with Rayon-parallel cell counting
/// - Memory: O(node_count) for indices + O(grid_cells) for offsets
///
/// # Implementation Notes
/// - Uses "offset array" pattern (like compressed sparse rows)
/// - `cell_offsets[i]..cell_offsets[i+1]` contains all nodes in cell i
/// - Non-finite positions are never indexed
///
/// # Examples
/// ```
/// use geocast_core::spatial_hash::SpatialHash;
/// use geocast_data::Position;
///
/// let mut spatial = SpatialHash::new(10.0);
/// let positions = vec![
///     Position::new(1.0, 1.0, 0.0),
///     Position::new(5.0, 1.0, 0.0),
///     Position::new(80.0, 80.0, 0.0),
/// ];
/// spatial.build(&positions);
///
/// let mut nearby = Vec::new();
/// spatial.query_into(&Position::new(1.0, 1.0, 0.0), 10.0, &mut nearby);
/// assert_eq!(nearby.len(), 2);
/// ```
pub struct SpatialHash {
    /// Requested cell edge length.
    pub base_cell_size: f64,
    /// Edge length in use; grows past `base_cell_size` for very sparse boxes.
    pub cell_size: f64,
    pub origin: Position,
    pub cols: usize,
    pub rows: usize,
    pub layers: usize,
    pub cell_offsets: Vec<usize>,
    pub node_indices: Vec<usize>,
}

impl SpatialHash {
    /// Creates an empty hash; `cell_size` is usually the communication range.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            base_cell_size: cell_size,
            cell_size,
            origin: Position::default(),
            cols: 0,
            rows: 0,
            layers: 0,
            cell_offsets: vec![0],
            node_indices: Vec::new(),
        }
    }

    #[inline]
    fn axis_cell(&self, value: f64, origin: f64, cells: usize) -> Option<usize> {
        if !value.is_finite() || cells == 0 {
            return None;
        }
        let c = ((value - origin) / self.cell_size).floor();
        if c < 0.0 || c > i32::MAX as f64 {
            return None;
        }
        let c = c as usize;
        if c >= cells {
            None
        } else {
            Some(c)
        }
    }

    /// Flat cell index for a position, `None` when outside the indexed box.
    #[inline]
    pub fn get_cell_idx(&self, p: &Position) -> Option<usize> {
        let cx = self.axis_cell(p.x, self.origin.x, self.cols)?;
        let cy = self.axis_cell(p.y, self.origin.y, self.rows)?;
        let cz = self.axis_cell(p.z, self.origin.z, self.layers)?;
        Some((cz * self.rows + cy) * self.cols + cx)
    }

    pub fn build(&mut self, positions: &[Position]) {
        let finite: Vec<&Position> = positions.iter().filter(|p| p.is_finite()).collect();
        if finite.is_empty() {
            self.cols = 0;
            self.rows = 0;
            self.layers = 0;
            self.cell_offsets = vec![0];
            self.node_indices.clear();
            return;
        }

        let mut min = *finite[0];
        let mut max = *finite[0];
        for p in &finite {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        self.origin = min;

        // Cells along one axis, capped so the cast cannot saturate.
        let extent = |lo: f64, hi: f64, size: f64| {
            let span = ((hi - lo) / size).floor();
            if span.is_finite() {
                (span.min(MAX_CELLS as f64) as usize).saturating_add(1)
            } else {
                MAX_CELLS + 1
            }
        };
        let mut size = self.base_cell_size;
        loop {
            if !size.is_finite() {
                // Span overflowed f64; a single cell holds everything.
                self.cols = 1;
                self.rows = 1;
                self.layers = 1;
                break;
            }
            self.cols = extent(min.x, max.x, size);
            self.rows = extent(min.y, max.y, size);
            self.layers = extent(min.z, max.z, size);
            let cells = self
                .cols
                .saturating_mul(self.rows)
                .saturating_mul(self.layers);
            if cells <= MAX_CELLS {
                break;
            }
            size *= 2.0;
        }
        self.cell_size = size;

        let cell_count = self.cols * self.rows * self.layers;

        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        positions.par_iter().for_each(|p| {
            if let Some(idx) = self.get_cell_idx(p) {
                atomic_counts[idx].fetch_add(1, AtomicOrdering::Relaxed);
            }
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(|a| a.into_inner()).collect();

        self.cell_offsets.clear();
        self.cell_offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.cell_offsets[i] = total;
            total += count;
        }
        self.cell_offsets[cell_count] = total;

        self.node_indices.clear();
        self.node_indices.resize(total, 0);
        let mut current_offsets = self.cell_offsets[..cell_count].to_vec();
        for (node_idx, p) in positions.iter().enumerate() {
            if let Some(cell_idx) = self.get_cell_idx(p) {
                let write_idx = current_offsets[cell_idx];
                self.node_indices[write_idx] = node_idx;
                current_offsets[cell_idx] += 1;
            }
        }
    }

    fn cell_span(&self, value: f64, radius: f64, origin: f64, cells: usize) -> (usize, usize) {
        let lo = ((value - radius - origin) / self.cell_size).floor().max(0.0) as usize;
        let hi = ((value + radius - origin) / self.cell_size).floor();
        let hi = if hi < 0.0 { 0 } else { (hi as usize).min(cells.saturating_sub(1)) };
        (lo, hi)
    }

    pub fn query_callback<F>(&self, p: &Position, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        if self.cols == 0 || !p.is_finite() || !radius.is_finite() {
            return;
        }
        let (x0, x1) = self.cell_span(p.x, radius, self.origin.x, self.cols);
        let (y0, y1) = self.cell_span(p.y, radius, self.origin.y, self.rows);
        let (z0, z1) = self.cell_span(p.z, radius, self.origin.z, self.layers);

        for cz in z0..=z1 {
            if cz >= self.layers {
                continue;
            }
            for cy in y0..=y1 {
                if cy >= self.rows {
                    continue;
                }
                for cx in x0..=x1 {
                    if cx >= self.cols {
                        continue;
                    }
                    let cell_idx = (cz * self.rows + cy) * self.cols + cx;
                    let start = self.cell_offsets[cell_idx];
                    let end = self.cell_offsets[cell_idx + 1];
                    for &node_idx in &self.node_indices[start..end] {
                        callback(node_idx);
                    }
                }
            }
        }
    }

    /// Candidate indices in the cells overlapping the query cube.
    ///
    /// Callers filter by exact distance.
    #[inline]
    pub fn query_into(&self, p: &Position, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        self.query_callback(p, radius, |idx| result.push(idx));
    }

    pub fn count_nearby(&self, p: &Position, radius: f64) -> usize {
        let mut count = 0;
        self.query_callback(p, radius, |_| count += 1);
        count
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_spatial_hash_query_finds_nearby() {
        let mut sh = SpatialHash::new(5.0);
        let data = vec![
            Position::new(1.0, 1.0, 0.0),
            Position::new(2.0, 2.0, 0.0),
            Position::new(10.0, 10.0, 0.0),
            Position::new(1.0, 1.0, 40.0),
        ];
        sh.build(&data);

        let mut found = Vec::new();
        sh.query_into(&Position::new(1.5, 1.5, 0.0), 2.0, &mut found);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn test_spatial_hash_negative_coordinates() {
        let mut sh = SpatialHash::new(7.0);
        let data = vec![Position::new(-5.0, -3.0, 0.0), Position::new(0.0, 0.0, 0.0)];
        sh.build(&data);
        assert_eq!(sh.count_nearby(&Position::new(0.0, 0.0, 0.0), 7.0), 2);
    }

    #[test]
    fn test_spatial_hash_skips_non_finite() {
        let mut sh = SpatialHash::new(5.0);
        let data = vec![Position::new(f64::NAN, 0.0, 0.0), Position::new(1.0, 1.0, 1.0)];
        sh.build(&data);
        let mut found = Vec::new();
        sh.query_into(&Position::new(1.0, 1.0, 1.0), 100.0, &mut found);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn test_spatial_hash_huge_finite_extent() {
        let mut sh = SpatialHash::new(15.0);
        let data = vec![
            Position::new(0.0, 0.0, 0.0),
            Position::new(7.0, 0.0, 0.0),
            Position::new(1e300, 0.0, 0.0),
        ];
        sh.build(&data);
        assert!(sh.cols * sh.rows * sh.layers <= MAX_CELLS);

        let mut found = Vec::new();
        sh.query_into(&Position::new(0.0, 0.0, 0.0), 15.0, &mut found);
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn test_spatial_hash_overflowing_span() {
        let mut sh = SpatialHash::new(15.0);
        let data = vec![
            Position::new(-1.5e308, 0.0, 0.0),
            Position::new(1.5e308, 0.0, 0.0),
        ];
        sh.build(&data);
        assert_eq!((sh.cols, sh.rows, sh.layers), (1, 1, 1));
        assert_eq!(sh.count_nearby(&Position::new(1.5e308, 0.0, 0.0), 15.0), 2);
    }

    #[test]
    fn test_spatial_hash_clear() {
        let mut sh = SpatialHash::new(5.0);
        sh.build(&[Position::new(1.0, 1.0, 1.0)]);
        sh.build(&[]);
        assert_eq!(sh.count_nearby(&Position::new(1.0, 1.0, 1.0), 10.0), 0);
    }
}
