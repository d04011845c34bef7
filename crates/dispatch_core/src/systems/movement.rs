//! Movement system: advances every assigned ride by one grid step per tick.
//!
//! Each axis moves one unit toward the current target, so drivers travel
//! diagonally even though the nearest-driver search measures grid steps.
//! Landing exactly on pickup switches the ride to its dropoff leg; landing on
//! dropoff completes it. Completed requests are removed through deferred
//! commands, so every ride assigned at the start of the tick is moved exactly
//! once regardless of completions during the pass.

use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut, Without};
use tracing::{debug, error, info};

use crate::clock::TickClock;
use crate::directory::Directory;
use crate::ecs::{Driver, DriverStatus, Position, RidePhase, RideRequest, RideStatus, Rider};
use crate::runner::TickStats;
use crate::spatial::SpatialIndex;
use crate::telemetry::{CompletedRideRecord, DispatchTelemetry};

#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn movement_system(
    mut commands: Commands,
    clock: Res<TickClock>,
    directory: Res<Directory>,
    mut spatial_index: ResMut<SpatialIndex>,
    mut telemetry: ResMut<DispatchTelemetry>,
    mut stats: ResMut<TickStats>,
    mut rides: Query<(Entity, &mut Rider, &mut Position, &mut RideRequest)>,
    mut drivers: Query<(&mut Driver, &mut Position), Without<Rider>>,
) {
    let now = clock.now();

    for (rider_entity, mut rider, mut rider_pos, mut request) in rides.iter_mut() {
        if !request.is_assigned() {
            continue;
        }
        let target = match request.phase {
            RidePhase::ToPickup => request.pickup,
            RidePhase::ToDropoff => request.dropoff,
            RidePhase::Completed => continue,
        };

        let Some(driver_entity) = request
            .assigned_driver
            .as_ref()
            .and_then(|id| directory.driver(id))
        else {
            error!(rider = %request.rider, "assigned driver is not registered; ride not advanced");
            continue;
        };
        let Ok((mut driver, mut driver_pos)) = drivers.get_mut(driver_entity) else {
            error!(rider = %request.rider, "assigned driver entity is missing; ride not advanced");
            continue;
        };

        let from = driver_pos.0;
        let next = from.step_toward(target);
        if let Err(err) = spatial_index.relocate(driver_entity, from, next) {
            // The index and the driver's position disagree: a defect, not a recoverable state.
            panic!("spatial index out of sync for driver {}: {err}", driver.id);
        }
        driver_pos.0 = next;
        stats.moved += 1;
        debug!(driver = %driver.id, %from, to = %next, tick = now, "driver moved");

        if next != target {
            continue;
        }

        let arrived_phase = request.phase;
        match arrived_phase {
            RidePhase::ToPickup => {
                request.phase = RidePhase::ToDropoff;
                request.pickup_at = Some(now);
                info!(rider = %request.rider, driver = %driver.id, tick = now, "rider picked up");
            }
            RidePhase::ToDropoff => {
                request.phase = RidePhase::Completed;
                request.status = RideStatus::Completed;
                driver.status = DriverStatus::Available;
                rider_pos.0 = request.dropoff;
                rider.last_dropoff = request.dropoff;

                telemetry.completed_rides.push(CompletedRideRecord {
                    rider: request.rider.clone(),
                    driver: driver.id.clone(),
                    pickup: request.pickup,
                    dropoff: request.dropoff,
                    requested_at: request.requested_at,
                    matched_at: request.matched_at.unwrap_or(request.requested_at),
                    pickup_at: request.pickup_at.unwrap_or(now),
                    completed_at: now,
                    rejections: request.drivers_rejected.len(),
                });
                commands.entity(rider_entity).remove::<RideRequest>();
                stats.completed += 1;
                info!(rider = %request.rider, driver = %driver.id, tick = now, "ride completed");
            }
            RidePhase::Completed => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::World;

    use crate::ecs::{DriverId, RiderId};
    use crate::grid::Cell;
    use crate::runner::{run_tick, tick_schedule};

    fn cell(x: i64, y: i64) -> Cell {
        Cell::new(x, y).expect("valid cell")
    }

    /// Spawns one assigned ride directly into a bare world.
    fn setup_assigned_ride(
        world: &mut World,
        driver_at: Cell,
        pickup: Cell,
        dropoff: Cell,
    ) -> (Entity, Entity) {
        world.insert_resource(TickClock::default());
        world.insert_resource(Directory::default());
        world.insert_resource(SpatialIndex::new());
        world.insert_resource(DispatchTelemetry::default());
        world.insert_resource(TickStats::default());

        let driver_id = DriverId::from("d1");
        let rider_id = RiderId::from("r1");
        let driver_entity = world
            .spawn((
                Driver {
                    id: driver_id.clone(),
                    status: DriverStatus::OnTrip,
                },
                Position(driver_at),
            ))
            .id();
        let mut request = RideRequest::new(rider_id.clone(), pickup, dropoff, driver_id.clone(), 0);
        request.status = RideStatus::Assigned;
        request.assigned_driver = Some(driver_id.clone());
        request.offered_driver = None;
        request.matched_at = Some(0);
        let rider_entity = world
            .spawn((
                Rider {
                    id: rider_id.clone(),
                    last_dropoff: pickup,
                },
                Position(pickup),
                request,
            ))
            .id();

        world.resource_mut::<SpatialIndex>().insert(driver_entity, driver_at);
        let mut directory = world.resource_mut::<Directory>();
        directory.insert_driver(driver_id, driver_entity);
        directory.insert_rider(rider_id, rider_entity);
        (driver_entity, rider_entity)
    }

    #[test]
    fn movement_steps_driver_and_updates_index() {
        let mut world = World::new();
        let (driver_entity, rider_entity) =
            setup_assigned_ride(&mut world, cell(0, 0), cell(3, 1), cell(6, 6));

        let mut schedule = tick_schedule();
        let report = run_tick(&mut world, &mut schedule);

        assert_eq!(report.tick, 1);
        assert_eq!(report.moved, 1);
        assert_eq!(report.completed, 0);
        assert_eq!(report.active, 1);
        assert_eq!(world.get::<Position>(driver_entity), Some(&Position(cell(1, 1))));
        let index = world.resource::<SpatialIndex>();
        assert_eq!(index.cell_of(driver_entity), Some(cell(1, 1)));
        assert!(index.drivers_at(cell(0, 0)).is_empty());
        let request = world.get::<RideRequest>(rider_entity).expect("request");
        assert_eq!(request.phase, RidePhase::ToPickup);
    }

    #[test]
    fn completion_frees_driver_and_moves_rider() {
        let mut world = World::new();
        let (driver_entity, rider_entity) =
            setup_assigned_ride(&mut world, cell(2, 2), cell(2, 2), cell(3, 3));

        let mut schedule = tick_schedule();
        let first = run_tick(&mut world, &mut schedule);
        assert_eq!(first.completed, 0);
        assert_eq!(
            world.get::<RideRequest>(rider_entity).map(|r| r.phase),
            Some(RidePhase::ToDropoff)
        );

        let second = run_tick(&mut world, &mut schedule);
        assert_eq!(second.completed, 1);
        assert_eq!(second.active, 0);
        assert!(world.get::<RideRequest>(rider_entity).is_none());
        assert_eq!(
            world.get::<Driver>(driver_entity).map(|d| d.status),
            Some(DriverStatus::Available)
        );
        assert_eq!(world.get::<Position>(rider_entity), Some(&Position(cell(3, 3))));
        assert_eq!(
            world.get::<Rider>(rider_entity).map(|r| r.last_dropoff),
            Some(cell(3, 3))
        );

        let telemetry = world.resource::<DispatchTelemetry>();
        assert_eq!(telemetry.completed_rides.len(), 1);
        let record = &telemetry.completed_rides[0];
        assert_eq!(record.pickup_at, 1);
        assert_eq!(record.completed_at, 2);
        assert_eq!(record.trip_duration(), 1);
    }

    #[test]
    #[should_panic(expected = "spatial index out of sync")]
    fn desynchronized_index_is_a_defect() {
        let mut world = World::new();
        let (driver_entity, _) =
            setup_assigned_ride(&mut world, cell(0, 0), cell(5, 5), cell(6, 6));
        world
            .resource_mut::<SpatialIndex>()
            .remove(driver_entity, cell(0, 0))
            .expect("indexed");

        let mut schedule = tick_schedule();
        run_tick(&mut world, &mut schedule);
    }
}
