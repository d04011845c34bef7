//! The dispatch world: one owning aggregate for drivers, riders, the spatial
//! index, active ride requests and the tick clock.
//!
//! Every operation takes `&mut self` and either applies fully or returns an
//! error with nothing changed. Concurrent callers must serialize all
//! operations on one world behind a single lock.

use bevy_ecs::prelude::{Entity, Schedule, World};
use tracing::{debug, info};

use crate::clock::TickClock;
use crate::directory::Directory;
use crate::dispatch::{self, Offer, OfferResponse};
use crate::ecs::{Driver, DriverId, DriverStatus, Position, RideRequest, Rider, RiderId};
use crate::error::DispatchError;
use crate::grid::Cell;
use crate::matching::{BfsDriverSearch, DriverSearch, DriverSearchResource};
use crate::runner::{self, TickReport, TickStats};
use crate::spatial::SpatialIndex;
use crate::telemetry::{DispatchTelemetry, DriverSnapshot, RiderSnapshot, WorldSnapshot};

pub struct DispatchWorld {
    world: World,
    tick_schedule: Schedule,
}

impl Default for DispatchWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchWorld {
    /// Create an empty world using breadth-first driver search.
    pub fn new() -> Self {
        Self::with_search(Box::new(BfsDriverSearch))
    }

    /// Create an empty world with a custom driver search.
    pub fn with_search(search: Box<dyn DriverSearch>) -> Self {
        let mut world = World::new();
        world.insert_resource(TickClock::default());
        world.insert_resource(Directory::default());
        world.insert_resource(SpatialIndex::new());
        world.insert_resource(DriverSearchResource::new(search));
        world.insert_resource(DispatchTelemetry::default());
        world.insert_resource(TickStats::default());
        Self {
            world,
            tick_schedule: runner::tick_schedule(),
        }
    }

    fn driver_entity(&self, id: &DriverId) -> Result<Entity, DispatchError> {
        self.world
            .resource::<Directory>()
            .driver(id)
            .ok_or_else(|| DispatchError::DriverNotFound(id.clone()))
    }

    fn rider_entity(&self, id: &RiderId) -> Result<Entity, DispatchError> {
        self.world
            .resource::<Directory>()
            .rider(id)
            .ok_or_else(|| DispatchError::RiderNotFound(id.clone()))
    }

    fn driver_state(&self, id: &DriverId) -> Result<(Entity, DriverStatus, Cell), DispatchError> {
        let entity = self.driver_entity(id)?;
        let status = self.world.get::<Driver>(entity).map(|driver| driver.status);
        let cell = self.world.get::<Position>(entity).map(|position| position.0);
        match (status, cell) {
            (Some(status), Some(cell)) => Ok((entity, status, cell)),
            _ => Err(DispatchError::DriverNotFound(id.clone())),
        }
    }

    fn relocate_driver(&mut self, entity: Entity, from: Cell, to: Cell) {
        if let Err(err) = self
            .world
            .resource_mut::<SpatialIndex>()
            .relocate(entity, from, to)
        {
            panic!("spatial index out of sync: {err}");
        }
        if let Some(mut position) = self.world.get_mut::<Position>(entity) {
            position.0 = to;
        }
    }

    /// Register a new available driver at `(x, y)`, or move an existing one there.
    ///
    /// Re-registration keeps the driver's status, including mid-trip; the next
    /// tick continues the ride from the new cell.
    pub fn register_driver(
        &mut self,
        id: impl Into<DriverId>,
        x: i64,
        y: i64,
    ) -> Result<(), DispatchError> {
        let id = id.into();
        let cell = Cell::new(x, y)?;

        if let Ok((entity, _status, from)) = self.driver_state(&id) {
            self.relocate_driver(entity, from, cell);
            debug!(driver = %id, %from, to = %cell, "driver relocated");
            return Ok(());
        }

        let entity = self
            .world
            .spawn((
                Driver {
                    id: id.clone(),
                    status: DriverStatus::Available,
                },
                Position(cell),
            ))
            .id();
        self.world.resource_mut::<SpatialIndex>().insert(entity, cell);
        self.world.resource_mut::<Directory>().insert_driver(id.clone(), entity);
        info!(driver = %id, %cell, "driver registered");
        Ok(())
    }

    /// Register a rider at `(x, y)`, or move an existing rider there.
    pub fn register_rider(
        &mut self,
        id: impl Into<RiderId>,
        x: i64,
        y: i64,
    ) -> Result<(), DispatchError> {
        let id = id.into();
        let cell = Cell::new(x, y)?;

        if let Ok(entity) = self.rider_entity(&id) {
            if let Some(mut position) = self.world.get_mut::<Position>(entity) {
                position.0 = cell;
            }
            if let Some(mut rider) = self.world.get_mut::<Rider>(entity) {
                rider.last_dropoff = cell;
            }
            debug!(rider = %id, %cell, "rider relocated");
            return Ok(());
        }

        let entity = self
            .world
            .spawn((
                Rider {
                    id: id.clone(),
                    last_dropoff: cell,
                },
                Position(cell),
            ))
            .id();
        self.world.resource_mut::<Directory>().insert_rider(id.clone(), entity);
        info!(rider = %id, %cell, "rider registered");
        Ok(())
    }

    /// Delete a driver. Drivers on a trip cannot be removed.
    ///
    /// Riders holding an outstanding offer to this driver keep their waiting
    /// request; responses naming the removed driver fail with `DriverNotFound`
    /// and the rider can request again.
    pub fn remove_driver(&mut self, id: &DriverId) -> Result<(), DispatchError> {
        let (entity, status, cell) = self.driver_state(id)?;
        if status == DriverStatus::OnTrip {
            return Err(DispatchError::DriverOnTrip(id.clone()));
        }

        if let Err(err) = self
            .world
            .resource_mut::<SpatialIndex>()
            .remove(entity, cell)
        {
            panic!("spatial index out of sync: {err}");
        }
        self.world.resource_mut::<Directory>().remove_driver(id);
        self.world.despawn(entity);
        info!(driver = %id, "driver removed");
        Ok(())
    }

    /// Delete a rider and any waiting request. Riders on a trip cannot be removed.
    pub fn remove_rider(&mut self, id: &RiderId) -> Result<(), DispatchError> {
        let entity = self.rider_entity(id)?;
        if self
            .world
            .get::<RideRequest>(entity)
            .is_some_and(RideRequest::is_assigned)
        {
            return Err(DispatchError::RiderOnTrip(id.clone()));
        }

        self.world.resource_mut::<Directory>().remove_rider(id);
        self.world.despawn(entity);
        info!(rider = %id, "rider removed");
        Ok(())
    }

    /// Take a driver out of the search without removing it.
    pub fn set_driver_offline(&mut self, id: &DriverId) -> Result<(), DispatchError> {
        self.set_driver_availability(id, DriverStatus::Offline)
    }

    /// Make an offline driver searchable again.
    pub fn set_driver_online(&mut self, id: &DriverId) -> Result<(), DispatchError> {
        self.set_driver_availability(id, DriverStatus::Available)
    }

    fn set_driver_availability(
        &mut self,
        id: &DriverId,
        status: DriverStatus,
    ) -> Result<(), DispatchError> {
        let (entity, current, _cell) = self.driver_state(id)?;
        if current == DriverStatus::OnTrip {
            return Err(DispatchError::DriverOnTrip(id.clone()));
        }
        if let Some(mut driver) = self.world.get_mut::<Driver>(entity) {
            driver.status = status;
        }
        debug!(driver = %id, ?status, "driver availability changed");
        Ok(())
    }

    /// Request a ride for `rider` to `(dropoff_x, dropoff_y)`; see [`dispatch::request_ride`].
    pub fn request_ride(
        &mut self,
        rider: &RiderId,
        dropoff_x: i64,
        dropoff_y: i64,
    ) -> Result<Offer, DispatchError> {
        dispatch::request_ride(&mut self.world, rider, dropoff_x, dropoff_y)
    }

    /// Answer the rider's outstanding offer; see [`dispatch::respond_to_offer`].
    pub fn respond_to_offer(
        &mut self,
        rider: &RiderId,
        driver: &DriverId,
        accepted: bool,
    ) -> Result<OfferResponse, DispatchError> {
        dispatch::respond_to_offer(&mut self.world, rider, driver, accepted)
    }

    /// Advance every assigned ride by one step.
    pub fn advance(&mut self) -> TickReport {
        runner::run_tick(&mut self.world, &mut self.tick_schedule)
    }

    /// Advance until no assigned ride remains or `max_ticks` ticks have run.
    pub fn advance_until_idle(&mut self, max_ticks: u64) -> u64 {
        runner::run_until_idle(&mut self.world, &mut self.tick_schedule, max_ticks)
    }

    pub fn tick(&self) -> u64 {
        self.world.resource::<TickClock>().now()
    }

    pub fn driver(&self, id: &DriverId) -> Option<DriverSnapshot> {
        let entity = self.world.resource::<Directory>().driver(id)?;
        self.driver_snapshot(entity)
    }

    pub fn rider(&self, id: &RiderId) -> Option<RiderSnapshot> {
        let entity = self.world.resource::<Directory>().rider(id)?;
        self.rider_snapshot(entity)
    }

    /// The rider's active ride request, if any.
    pub fn ride(&self, rider: &RiderId) -> Option<&RideRequest> {
        let entity = self.world.resource::<Directory>().rider(rider)?;
        self.world.get::<RideRequest>(entity)
    }

    /// Ids of drivers at `cell`, oldest arrival first.
    pub fn drivers_at(&self, cell: Cell) -> Vec<DriverId> {
        self.world
            .resource::<SpatialIndex>()
            .drivers_at(cell)
            .iter()
            .filter_map(|entity| self.world.get::<Driver>(*entity))
            .map(|driver| driver.id.clone())
            .collect()
    }

    /// Registered rider ids in sorted order.
    pub fn rider_ids(&self) -> Vec<RiderId> {
        let mut ids: Vec<RiderId> = self
            .world
            .resource::<Directory>()
            .riders()
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of active (waiting or assigned) ride requests.
    pub fn active_rides(&self) -> usize {
        self.active_requests().count()
    }

    pub fn assigned_rides(&self) -> usize {
        self.active_requests()
            .filter(|request| request.is_assigned())
            .count()
    }

    fn active_requests(&self) -> impl Iterator<Item = &RideRequest> + '_ {
        self.world
            .resource::<Directory>()
            .riders()
            .filter_map(move |(_, entity)| self.world.get::<RideRequest>(entity))
    }

    fn driver_snapshot(&self, entity: Entity) -> Option<DriverSnapshot> {
        let driver = self.world.get::<Driver>(entity)?;
        let position = self.world.get::<Position>(entity)?;
        Some(DriverSnapshot {
            id: driver.id.clone(),
            location: position.0,
            status: driver.status,
        })
    }

    fn rider_snapshot(&self, entity: Entity) -> Option<RiderSnapshot> {
        let rider = self.world.get::<Rider>(entity)?;
        let position = self.world.get::<Position>(entity)?;
        Some(RiderSnapshot {
            id: rider.id.clone(),
            location: position.0,
            last_dropoff: rider.last_dropoff,
        })
    }

    /// All drivers, riders and active requests, sorted by id, with the current tick.
    pub fn snapshot(&self) -> WorldSnapshot {
        let directory = self.world.resource::<Directory>();
        let drivers = directory
            .drivers()
            .filter_map(|(_, entity)| self.driver_snapshot(entity))
            .collect();
        let riders = directory
            .riders()
            .filter_map(|(_, entity)| self.rider_snapshot(entity))
            .collect();
        let ride_requests = self.active_requests().cloned().collect();
        WorldSnapshot::new(self.tick(), drivers, riders, ride_requests)
    }

    pub fn telemetry(&self) -> &DispatchTelemetry {
        self.world.resource::<DispatchTelemetry>()
    }

    pub fn spatial_index(&self) -> &SpatialIndex {
        self.world.resource::<SpatialIndex>()
    }

    /// Underlying ECS world, for inspection.
    pub fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: i64, y: i64) -> Cell {
        Cell::new(x, y).expect("valid cell")
    }

    #[test]
    fn registering_driver_indexes_it() {
        let mut world = DispatchWorld::new();
        world.register_driver("d1", 4, 7).expect("register");

        let driver = world.driver(&DriverId::from("d1")).expect("driver");
        assert_eq!(driver.location, cell(4, 7));
        assert_eq!(driver.status, DriverStatus::Available);
        assert_eq!(world.drivers_at(cell(4, 7)), vec![DriverId::from("d1")]);
        assert_eq!(world.spatial_index().len(), 1);
    }

    #[test]
    fn re_registering_driver_relocates_instead_of_duplicating() {
        let mut world = DispatchWorld::new();
        world.register_driver("d1", 0, 0).expect("register");
        world.register_driver("d1", 9, 9).expect("re-register");

        assert!(world.drivers_at(cell(0, 0)).is_empty());
        assert_eq!(world.drivers_at(cell(9, 9)), vec![DriverId::from("d1")]);
        assert_eq!(world.spatial_index().len(), 1);
        assert_eq!(world.snapshot().drivers.len(), 1);
    }

    #[test]
    fn out_of_bounds_registration_creates_nothing() {
        let mut world = DispatchWorld::new();
        assert_eq!(
            world.register_driver("d1", 100, 0),
            Err(DispatchError::InvalidLocation { x: 100, y: 0 })
        );
        assert_eq!(
            world.register_rider("r1", 0, -1),
            Err(DispatchError::InvalidLocation { x: 0, y: -1 })
        );

        let snapshot = world.snapshot();
        assert!(snapshot.drivers.is_empty());
        assert!(snapshot.riders.is_empty());
        assert!(world.spatial_index().is_empty());
    }

    #[test]
    fn failed_relocation_keeps_previous_position() {
        let mut world = DispatchWorld::new();
        world.register_driver("d1", 3, 3).expect("register");
        assert!(world.register_driver("d1", 3, 300).is_err());
        assert_eq!(world.drivers_at(cell(3, 3)), vec![DriverId::from("d1")]);
    }

    #[test]
    fn removing_unknown_entities_is_not_found() {
        let mut world = DispatchWorld::new();
        assert_eq!(
            world.remove_driver(&DriverId::from("ghost")),
            Err(DispatchError::DriverNotFound(DriverId::from("ghost")))
        );
        assert_eq!(
            world.remove_rider(&RiderId::from("ghost")),
            Err(DispatchError::RiderNotFound(RiderId::from("ghost")))
        );
    }

    #[test]
    fn removing_driver_deindexes_it() {
        let mut world = DispatchWorld::new();
        world.register_driver("d1", 1, 1).expect("register");
        world.register_driver("d2", 1, 1).expect("register");
        world.remove_driver(&DriverId::from("d1")).expect("remove");

        assert_eq!(world.drivers_at(cell(1, 1)), vec![DriverId::from("d2")]);
        assert!(world.driver(&DriverId::from("d1")).is_none());
    }

    #[test]
    fn re_registering_rider_moves_pickup_origin() {
        let mut world = DispatchWorld::new();
        world.register_rider("r1", 1, 2).expect("register");
        world.register_rider("r1", 8, 9).expect("re-register");

        let rider = world.rider(&RiderId::from("r1")).expect("rider");
        assert_eq!(rider.location, cell(8, 9));
        assert_eq!(rider.last_dropoff, cell(8, 9));
        assert_eq!(world.rider_ids(), vec![RiderId::from("r1")]);
    }

    #[test]
    fn offline_driver_toggles_status() {
        let mut world = DispatchWorld::new();
        let id = DriverId::from("d1");
        world.register_driver("d1", 0, 0).expect("register");

        world.set_driver_offline(&id).expect("offline");
        assert_eq!(world.driver(&id).map(|d| d.status), Some(DriverStatus::Offline));
        world.set_driver_online(&id).expect("online");
        assert_eq!(world.driver(&id).map(|d| d.status), Some(DriverStatus::Available));
    }

    #[test]
    fn custom_search_decides_offers() {
        use crate::matching::SearchHit;

        struct NeverFinds;

        impl DriverSearch for NeverFinds {
            fn find_nearest(
                &self,
                _index: &SpatialIndex,
                _origin: Cell,
                _is_eligible: &dyn Fn(Entity) -> bool,
            ) -> Option<SearchHit> {
                None
            }
        }

        let mut world = DispatchWorld::with_search(Box::new(NeverFinds));
        world.register_driver("d1", 0, 0).expect("register");
        world.register_rider("r1", 0, 0).expect("register");
        assert_eq!(
            world.request_ride(&RiderId::from("r1"), 1, 1),
            Err(DispatchError::NoDriverAvailable(RiderId::from("r1")))
        );
    }

    #[test]
    fn advance_on_empty_world_only_counts_ticks() {
        let mut world = DispatchWorld::new();
        let report = world.advance();
        assert_eq!(report.tick, 1);
        assert_eq!(report.moved, 0);
        assert_eq!(report.active, 0);
        assert_eq!(world.tick(), 1);
        assert_eq!(world.snapshot().current_tick, 1);
    }
}
