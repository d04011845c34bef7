use bevy_ecs::prelude::Entity;

use crate::grid::Cell;

/// Closest eligible driver found by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub driver: Entity,
    /// Cell the driver was found in.
    pub cell: Cell,
    /// Grid-step distance from the search origin.
    pub distance: u32,
}
