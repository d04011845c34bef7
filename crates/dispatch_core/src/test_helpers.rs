//! Test helpers for common test setup and utilities.
//!
//! Shared by unit tests, integration tests and benchmarks.

use crate::ecs::{DriverId, RiderId};
use crate::error::DispatchError;
use crate::grid::Cell;
use crate::world::DispatchWorld;

/// Build a cell from coordinates known to be in bounds.
///
/// # Panics
///
/// Panics if the coordinates are outside the grid.
pub fn cell(x: i64, y: i64) -> Cell {
    Cell::new(x, y).expect("test coordinates should be on the grid")
}

/// A world with the given drivers and riders registered, in order.
///
/// # Panics
///
/// Panics if any coordinate is outside the grid.
pub fn create_test_world(drivers: &[(&str, i64, i64)], riders: &[(&str, i64, i64)]) -> DispatchWorld {
    let mut world = DispatchWorld::new();
    for (id, x, y) in drivers {
        world
            .register_driver(*id, *x, *y)
            .expect("test driver should register");
    }
    for (id, x, y) in riders {
        world
            .register_rider(*id, *x, *y)
            .expect("test rider should register");
    }
    world
}

/// Request a ride and accept the first offer; returns the assigned driver.
pub fn assign_ride(
    world: &mut DispatchWorld,
    rider: &str,
    dropoff: (i64, i64),
) -> Result<DriverId, DispatchError> {
    let rider = RiderId::from(rider);
    let offer = world.request_ride(&rider, dropoff.0, dropoff.1)?;
    world.respond_to_offer(&rider, &offer.driver, true)?;
    Ok(offer.driver)
}
