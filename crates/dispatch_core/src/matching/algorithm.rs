use bevy_ecs::prelude::Entity;

use super::types::SearchHit;
use crate::grid::Cell;
use crate::spatial::SpatialIndex;

/// Finds the driver to offer a ride to.
///
/// Implementations decide which drivers to look at and in what order; the
/// caller decides who is eligible (status, prior rejections) through
/// `is_eligible`, so a search never needs to know about ride state.
pub trait DriverSearch: Send + Sync {
    /// Find the closest eligible driver to `origin`.
    ///
    /// # Arguments
    ///
    /// * `index` - Current driver positions
    /// * `origin` - Pickup cell the search starts from
    /// * `is_eligible` - Whether a driver entity may receive the offer
    ///
    /// # Returns
    ///
    /// The winning driver with its grid-step distance from `origin`, or `None`
    /// if no eligible driver is indexed anywhere on the grid.
    fn find_nearest(
        &self,
        index: &SpatialIndex,
        origin: Cell,
        is_eligible: &dyn Fn(Entity) -> bool,
    ) -> Option<SearchHit>;
}
