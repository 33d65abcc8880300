//! # Point Spatial Index
//!
//! Hash grid over node coordinates for proximity queries.
//!
//! ## Features
//!
//! - **Pair queries**: every unordered pair of points within a radius
//! - **Ball queries**: every point within a radius of a center
//!
//! Pair queries only visit the 27 cells around each point, so the cell size
//! must be at least the query radius. Results are sorted so callers can rely
//! on a canonical order.

use glam::DVec3;
use std::collections::{BTreeSet, HashMap};

/// 3D cell coordinate for spatial hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct CellCoord {
    x: i64,
    y: i64,
    z: i64,
}

impl CellCoord {
    /// Creates a cell coordinate from 3D position.
    fn from_position(pos: DVec3, cell_size: f64) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i64,
            y: (pos.y / cell_size).floor() as i64,
            z: (pos.z / cell_size).floor() as i64,
        }
    }

    fn offset(self, dx: i64, dy: i64, dz: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }
}

/// Spatial index over a slice of points, addressed by slice position.
#[derive(Debug)]
pub struct PointIndex<'a> {
    points: &'a [DVec3],
    grid: HashMap<CellCoord, Vec<usize>>,
    cell_size: f64,
}

impl<'a> PointIndex<'a> {
    /// Indexes `points` on a grid of `cell_size` cubes.
    pub fn new(points: &'a [DVec3], cell_size: f64) -> Self {
        let mut grid: HashMap<CellCoord, Vec<usize>> = HashMap::new();
        for (i, &p) in points.iter().enumerate() {
            grid.entry(CellCoord::from_position(p, cell_size))
                .or_default()
                .push(i);
        }
        Self {
            points,
            grid,
            cell_size,
        }
    }

    /// Returns the number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    /// Returns the cell size used for hashing.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// All pairs `(i, j)` with `i < j` whose distance is at most `radius`,
    /// sorted ascending.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fem_mesh::spatial::PointIndex;
    /// use glam::DVec3;
    ///
    /// let points = [DVec3::ZERO, DVec3::new(0.05, 0.0, 0.0), DVec3::X];
    /// let index = PointIndex::new(&points, 0.1);
    /// assert_eq!(index.query_pairs(0.1), vec![(0, 1)]);
    /// ```
    pub fn query_pairs(&self, radius: f64) -> Vec<(usize, usize)> {
        let radius_sq = radius * radius;
        let mut pairs = Vec::new();
        for (i, &p) in self.points.iter().enumerate() {
            let home = CellCoord::from_position(p, self.cell_size);
            for cell in neighbourhood(home) {
                let Some(candidates) = self.grid.get(&cell) else {
                    continue;
                };
                for &j in candidates {
                    if j > i && p.distance_squared(self.points[j]) <= radius_sq {
                        pairs.push((i, j));
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    /// Indices of all points within `radius` of `center`, sorted ascending.
    ///
    /// Falls back to a linear scan when the ball spans more cells than there
    /// are points.
    pub fn query_ball(&self, center: DVec3, radius: f64) -> Vec<usize> {
        let radius_sq = radius * radius;
        let within = |i: &usize| center.distance_squared(self.points[*i]) <= radius_sq;

        let lo = CellCoord::from_position(center - DVec3::splat(radius), self.cell_size);
        let hi = CellCoord::from_position(center + DVec3::splat(radius), self.cell_size);
        let span = |a: i64, b: i64| (b.saturating_sub(a) as u64).saturating_add(1);
        let cells = span(lo.x, hi.x)
            .saturating_mul(span(lo.y, hi.y))
            .saturating_mul(span(lo.z, hi.z));

        let mut result: Vec<usize> = if cells > self.points.len() as u64 {
            (0..self.points.len()).filter(within).collect()
        } else {
            let mut found = Vec::new();
            for x in lo.x..=hi.x {
                for y in lo.y..=hi.y {
                    for z in lo.z..=hi.z {
                        if let Some(candidates) = self.grid.get(&CellCoord { x, y, z }) {
                            found.extend(candidates.iter().copied().filter(within));
                        }
                    }
                }
            }
            found
        };
        result.sort_unstable();
        result
    }
}

/// The 3x3x3 block of cells around `home`, without repeats at the i64 limits.
fn neighbourhood(home: CellCoord) -> BTreeSet<CellCoord> {
    let mut cells = BTreeSet::new();
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                cells.insert(home.offset(dx, dy, dz));
            }
        }
    }
    cells
}
