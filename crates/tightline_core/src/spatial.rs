//! Spatial indexing for proximity queries on organism positions.
//!
//! A uniform grid over the horizontal plane using the offset-array pattern
//! (compressed sparse rows): `offsets[i]..offsets[i+1]` addresses all items
//! in cell `i`. Rebuilt sequentially once per tick; depth is handled by the
//! callers' envelope checks, not the grid.
//!
//! Positions may drift slightly between the rebuild and a query (prey move
//! in the flock pass), so callers inflate the query radius by one tick of
//! travel and re-check exact distances.

/// Grid-based spatial index over item positions.
#[derive(Clone, Default)]
pub struct SpatialGrid {
    cell_size: f64,
    cols: usize,
    rows: usize,
    offsets: Vec<usize>,
    items: Vec<usize>,
}

impl SpatialGrid {
    pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
        let cols = (width / cell_size).ceil().max(1.0) as usize;
        let rows = (height / cell_size).ceil().max(1.0) as usize;
        Self {
            cell_size,
            cols,
            rows,
            offsets: vec![0; cols * rows + 1],
            items: Vec::new(),
        }
    }

    /// Cell index for a world coordinate. Out-of-bounds coordinates clamp
    /// to the border cell so organisms straddling the edge stay queryable;
    /// non-finite coordinates return None.
    #[inline]
    fn cell_idx(&self, x: f64, y: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let cx = ((x / self.cell_size) as i64).clamp(0, self.cols as i64 - 1) as usize;
        let cy = ((y / self.cell_size) as i64).clamp(0, self.rows as i64 - 1) as usize;
        Some(cy * self.cols + cx)
    }

    /// Rebuilds the index from scratch. Item `i` of `positions` is reported
    /// as index `i` by queries.
    pub fn rebuild(&mut self, positions: &[(f64, f64)]) {
        let cell_count = self.cols * self.rows;
        let mut counts = vec![0usize; cell_count];
        for &(x, y) in positions {
            if let Some(idx) = self.cell_idx(x, y) {
                counts[idx] += 1;
            }
        }

        self.offsets.resize(cell_count + 1, 0);
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            self.offsets[i] = total;
            total += count;
        }
        self.offsets[cell_count] = total;

        self.items.resize(total, 0);
        let mut cursor = self.offsets[..cell_count].to_vec();
        for (item_idx, &(x, y)) in positions.iter().enumerate() {
            if let Some(cell) = self.cell_idx(x, y) {
                self.items[cursor[cell]] = item_idx;
                cursor[cell] += 1;
            }
        }
    }

    /// Collects indices of all items in cells overlapping the query circle.
    /// Results are candidates only; callers re-check exact distances.
    #[inline]
    pub fn query_into(&self, x: f64, y: f64, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        if !x.is_finite() || !y.is_finite() || !radius.is_finite() {
            return;
        }
        let min_cx = (((x - radius) / self.cell_size).floor() as i64).clamp(0, self.cols as i64 - 1);
        let max_cx = (((x + radius) / self.cell_size).floor() as i64).clamp(0, self.cols as i64 - 1);
        let min_cy = (((y - radius) / self.cell_size).floor() as i64).clamp(0, self.rows as i64 - 1);
        let max_cy = (((y + radius) / self.cell_size).floor() as i64).clamp(0, self.rows as i64 - 1);

        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                let cell = cy as usize * self.cols + cx as usize;
                let start = self.offsets[cell];
                let end = self.offsets[cell + 1];
                result.extend_from_slice(&self.items[start..end]);
            }
        }
    }

    /// Number of candidate items near a position.
    pub fn count_nearby(&self, x: f64, y: f64, radius: f64) -> usize {
        let mut out = Vec::new();
        self.query_into(x, y, radius, &mut out);
        out.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_finds_nearby() {
        let mut grid = SpatialGrid::new(5.0, 20.0, 20.0);
        grid.rebuild(&[(1.0, 1.0), (2.0, 2.0), (15.0, 15.0)]);
        let mut out = Vec::new();
        grid.query_into(1.5, 1.5, 2.0, &mut out);
        assert!(out.contains(&0));
        assert!(out.contains(&1));
        assert!(!out.contains(&2));
    }

    #[test]
    fn test_rebuild_clears_previous_items() {
        let mut grid = SpatialGrid::new(5.0, 20.0, 20.0);
        grid.rebuild(&[(1.0, 1.0)]);
        grid.rebuild(&[]);
        assert_eq!(grid.count_nearby(1.0, 1.0, 10.0), 0);
    }

    #[test]
    fn test_out_of_bounds_positions_are_queryable() {
        let mut grid = SpatialGrid::new(5.0, 20.0, 20.0);
        grid.rebuild(&[(-3.0, 1.0), (25.0, 19.0)]);
        let mut out = Vec::new();
        grid.query_into(0.0, 0.0, 4.0, &mut out);
        assert!(out.contains(&0));
    }

    #[test]
    fn test_non_finite_positions_are_skipped() {
        let mut grid = SpatialGrid::new(5.0, 20.0, 20.0);
        grid.rebuild(&[(f64::NAN, 1.0), (1.0, 1.0)]);
        let mut out = Vec::new();
        grid.query_into(1.0, 1.0, 3.0, &mut out);
        assert_eq!(out, vec![1]);
    }
}
