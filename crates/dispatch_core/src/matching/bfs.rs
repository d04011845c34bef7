use bevy_ecs::prelude::Entity;
use pathfinding::prelude::bfs;

use super::algorithm::DriverSearch;
use super::types::SearchHit;
use crate::grid::Cell;
use crate::spatial::SpatialIndex;

/// Breadth-first nearest-driver search over 4-connected grid neighbors.
///
/// # Algorithm Behavior
///
/// 1. Expands cells outward from the origin in FIFO order, visiting each cell once
/// 2. In each cell, checks drivers in bucket (insertion) order
/// 3. Returns the first eligible driver with the BFS distance of its cell
///
/// Every cell at distance `d` is examined before any cell at `d + 1`, so the
/// first hit is at minimum grid-step distance. Among cells at equal distance,
/// the winner is the one discovered first under the +x, -x, +y, -y expansion
/// order; within a cell, the oldest arrival wins.
///
/// # Performance
///
/// O(cells visited), bounded by the 10,000 cells of the grid when no eligible
/// driver exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct BfsDriverSearch;

impl DriverSearch for BfsDriverSearch {
    fn find_nearest(
        &self,
        index: &SpatialIndex,
        origin: Cell,
        is_eligible: &dyn Fn(Entity) -> bool,
    ) -> Option<SearchHit> {
        let first_eligible = |cell: &Cell| {
            index
                .drivers_at(*cell)
                .iter()
                .copied()
                .find(|driver| is_eligible(*driver))
        };

        if let Some(driver) = first_eligible(&origin) {
            return Some(SearchHit {
                driver,
                cell: origin,
                distance: 0,
            });
        }

        // `bfs` tests cells as they are discovered; discovery order is dequeue
        // order, so the first hit matches a dequeue-time check.
        let path = bfs(
            &origin,
            |cell: &Cell| cell.neighbors(),
            |cell: &Cell| first_eligible(cell).is_some(),
        )?;
        let cell = *path.last()?;
        let driver = first_eligible(&cell)?;
        Some(SearchHit {
            driver,
            cell,
            distance: (path.len() - 1) as u32,
        })
    }
}
