//! Grid geometry: the fixed 100×100 integer grid every position lives on.
//!
//! This module provides:
//!
//! - **Cell**: a bounds-checked `(x, y)` coordinate; constructing one is the only
//!   place coordinates are validated, so every `Cell` in the world is in bounds
//! - **Neighbors**: 4-connected (up/down/left/right) in-bounds neighbors, used by search
//! - **Distances**: grid-step (Manhattan) for search, Chebyshev for movement
//! - **Stepping**: one tick of diagonal-capable movement toward a target

use std::fmt;

use serde::Serialize;

use crate::error::DispatchError;

/// Smallest valid coordinate on either axis.
pub const GRID_MIN: i32 = 0;
/// Largest valid coordinate on either axis.
pub const GRID_MAX: i32 = 99;

/// Expansion order for search: +x, -x, +y, -y.
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// One integer grid coordinate with both axes in `[GRID_MIN, GRID_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Cell {
    x: i32,
    y: i32,
}

impl Cell {
    /// Validate raw coordinates into a cell.
    pub fn new(x: i64, y: i64) -> Result<Self, DispatchError> {
        if !Self::in_bounds(x, y) {
            return Err(DispatchError::InvalidLocation { x, y });
        }
        Ok(Self {
            x: x as i32,
            y: y as i32,
        })
    }

    pub fn in_bounds(x: i64, y: i64) -> bool {
        let range = i64::from(GRID_MIN)..=i64::from(GRID_MAX);
        range.contains(&x) && range.contains(&y)
    }

    pub fn x(self) -> i32 {
        self.x
    }

    pub fn y(self) -> i32 {
        self.y
    }

    /// In-bounds 4-connected neighbors, in search expansion order.
    pub fn neighbors(self) -> impl Iterator<Item = Cell> {
        NEIGHBOR_OFFSETS.into_iter().filter_map(move |(dx, dy)| {
            Cell::new(i64::from(self.x + dx), i64::from(self.y + dy)).ok()
        })
    }

    /// Number of 4-connected moves between two cells.
    pub fn grid_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Number of ticks needed to reach `other` when both axes step each tick.
    pub fn chebyshev_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// One movement step toward `target`: each axis moves by -1, 0 or +1
    /// independently, so a step can be diagonal.
    pub fn step_toward(self, target: Cell) -> Cell {
        let x = (self.x + (target.x - self.x).signum()).clamp(GRID_MIN, GRID_MAX);
        let y = (self.y + (target.y - self.y).signum()).clamp(GRID_MIN, GRID_MAX);
        Cell { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: i64, y: i64) -> Cell {
        Cell::new(x, y).expect("valid cell")
    }

    #[test]
    fn rejects_coordinates_outside_grid() {
        for (x, y) in [(-1, 0), (0, -1), (100, 0), (0, 100), (i64::MAX, 5)] {
            assert_eq!(
                Cell::new(x, y),
                Err(DispatchError::InvalidLocation { x, y }),
                "({x}, {y}) should be rejected"
            );
        }
        assert!(Cell::new(0, 0).is_ok());
        assert!(Cell::new(99, 99).is_ok());
    }

    #[test]
    fn corner_has_two_neighbors_in_expansion_order() {
        let neighbors: Vec<_> = cell(0, 0).neighbors().collect();
        assert_eq!(neighbors, vec![cell(1, 0), cell(0, 1)]);

        let neighbors: Vec<_> = cell(99, 99).neighbors().collect();
        assert_eq!(neighbors, vec![cell(98, 99), cell(99, 98)]);
    }

    #[test]
    fn interior_cell_has_four_neighbors() {
        let neighbors: Vec<_> = cell(5, 5).neighbors().collect();
        assert_eq!(
            neighbors,
            vec![cell(6, 5), cell(4, 5), cell(5, 6), cell(5, 4)]
        );
    }

    #[test]
    fn distances_use_their_own_metric() {
        let a = cell(0, 0);
        let b = cell(3, 7);
        assert_eq!(a.grid_distance(b), 10);
        assert_eq!(a.chebyshev_distance(b), 7);
        assert_eq!(b.grid_distance(a), 10);
        assert_eq!(a.grid_distance(a), 0);
    }

    #[test]
    fn step_moves_both_axes_toward_target() {
        assert_eq!(cell(0, 0).step_toward(cell(5, 5)), cell(1, 1));
        assert_eq!(cell(5, 5).step_toward(cell(0, 9)), cell(4, 6));
        assert_eq!(cell(5, 5).step_toward(cell(5, 0)), cell(5, 4));
        assert_eq!(cell(5, 5).step_toward(cell(5, 5)), cell(5, 5));
    }

    #[test]
    fn repeated_steps_take_chebyshev_distance() {
        let target = cell(90, 12);
        let mut current = cell(3, 40);
        let mut steps = 0;
        while current != target {
            current = current.step_toward(target);
            steps += 1;
        }
        assert_eq!(steps, cell(3, 40).chebyshev_distance(target));
    }
}
