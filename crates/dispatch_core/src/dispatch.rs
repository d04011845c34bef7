//! Ride dispatcher: request creation, driver offers and accept/reject handling.
//!
//! A request starts `Waiting` with one outstanding offer. Offers are
//! provisional: the offered driver stays `Available` (and may be offered to
//! other riders) until it accepts. A rejection adds the driver to the request's
//! rejected set and produces at most one new offer per call; when no eligible
//! driver remains the request is dropped and the rider must request again.

use std::collections::BTreeSet;

use bevy_ecs::prelude::{Entity, World};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::TickClock;
use crate::directory::Directory;
use crate::ecs::{
    Driver, DriverId, DriverStatus, Position, RidePhase, RideRequest, RideStatus, RiderId,
};
use crate::error::DispatchError;
use crate::grid::Cell;
use crate::matching::DriverSearchResource;
use crate::spatial::SpatialIndex;
use crate::telemetry::{CancelledRideRecord, DispatchTelemetry};

/// A provisional offer of a driver to a rider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offer {
    pub driver: DriverId,
    /// Grid-step distance from the driver to the pickup cell.
    pub distance: u32,
}

/// Result of a driver's response to an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OfferResponse {
    /// The driver accepted and is now on trip.
    Assigned { driver: DriverId },
    /// The driver rejected; the next closest driver is offered.
    Reoffered(Offer),
    /// The driver rejected and nobody else is eligible; the request is gone.
    Cancelled,
}

/// Offer the closest available driver not in `excluded`.
fn find_offer(world: &World, origin: Cell, excluded: &BTreeSet<DriverId>) -> Option<Offer> {
    let index = world.resource::<SpatialIndex>();
    let search = world.resource::<DriverSearchResource>();
    let is_eligible = |entity: Entity| {
        world.get::<Driver>(entity).is_some_and(|driver| {
            driver.status == DriverStatus::Available && !excluded.contains(&driver.id)
        })
    };

    let hit = search.find_nearest(index, origin, &is_eligible)?;
    let driver = world.get::<Driver>(hit.driver)?;
    Some(Offer {
        driver: driver.id.clone(),
        distance: hit.distance,
    })
}

/// Create a ride request from the rider's current location to `(dropoff_x, dropoff_y)`
/// and offer it to the closest available driver.
///
/// A `Waiting` request the rider already holds is replaced; an `Assigned` one
/// fails with [`DispatchError::RiderOnTrip`]. When no driver is available no
/// request is created.
pub fn request_ride(
    world: &mut World,
    rider_id: &RiderId,
    dropoff_x: i64,
    dropoff_y: i64,
) -> Result<Offer, DispatchError> {
    let dropoff = Cell::new(dropoff_x, dropoff_y)?;
    let rider_entity = world
        .resource::<Directory>()
        .rider(rider_id)
        .ok_or_else(|| DispatchError::RiderNotFound(rider_id.clone()))?;
    if world
        .get::<RideRequest>(rider_entity)
        .is_some_and(RideRequest::is_assigned)
    {
        return Err(DispatchError::RiderOnTrip(rider_id.clone()));
    }
    let pickup = world
        .get::<Position>(rider_entity)
        .map(|position| position.0)
        .ok_or_else(|| DispatchError::RiderNotFound(rider_id.clone()))?;

    let Some(offer) = find_offer(world, pickup, &BTreeSet::new()) else {
        debug!(rider = %rider_id, %pickup, "no available driver for ride request");
        return Err(DispatchError::NoDriverAvailable(rider_id.clone()));
    };

    let now = world.resource::<TickClock>().now();
    let request = RideRequest::new(rider_id.clone(), pickup, dropoff, offer.driver.clone(), now);
    world.entity_mut(rider_entity).insert(request);

    debug!(
        rider = %rider_id,
        driver = %offer.driver,
        distance = offer.distance,
        %pickup,
        %dropoff,
        "ride offered"
    );
    Ok(offer)
}

/// Apply a driver's response to the rider's outstanding offer.
pub fn respond_to_offer(
    world: &mut World,
    rider_id: &RiderId,
    driver_id: &DriverId,
    accepted: bool,
) -> Result<OfferResponse, DispatchError> {
    let (rider_entity, driver_entity) = {
        let directory = world.resource::<Directory>();
        (directory.rider(rider_id), directory.driver(driver_id))
    };
    let ride_not_found = || DispatchError::RideNotFound(rider_id.clone());
    let rider_entity = rider_entity.ok_or_else(ride_not_found)?;
    let request = world
        .get::<RideRequest>(rider_entity)
        .ok_or_else(ride_not_found)?;
    let driver_entity =
        driver_entity.ok_or_else(|| DispatchError::DriverNotFound(driver_id.clone()))?;

    if request.is_assigned() {
        return Err(DispatchError::AlreadyAssigned(rider_id.clone()));
    }
    if let Some(offered) = &request.offered_driver {
        if offered != driver_id {
            return Err(DispatchError::OfferMismatch {
                rider: rider_id.clone(),
                offered: offered.clone(),
                responded: driver_id.clone(),
            });
        }
    }

    if accepted {
        accept_offer(world, rider_entity, driver_entity, rider_id, driver_id)
    } else {
        reject_offer(world, rider_entity, rider_id, driver_id)
    }
}

fn accept_offer(
    world: &mut World,
    rider_entity: Entity,
    driver_entity: Entity,
    rider_id: &RiderId,
    driver_id: &DriverId,
) -> Result<OfferResponse, DispatchError> {
    let available = world
        .get::<Driver>(driver_entity)
        .is_some_and(|driver| driver.status == DriverStatus::Available);
    if !available {
        return Err(DispatchError::DriverUnavailable(driver_id.clone()));
    }

    let now = world.resource::<TickClock>().now();
    if let Some(mut driver) = world.get_mut::<Driver>(driver_entity) {
        driver.status = DriverStatus::OnTrip;
    }
    if let Some(mut request) = world.get_mut::<RideRequest>(rider_entity) {
        request.status = RideStatus::Assigned;
        request.phase = RidePhase::ToPickup;
        request.assigned_driver = Some(driver_id.clone());
        request.offered_driver = None;
        request.matched_at = Some(now);
    }

    info!(rider = %rider_id, driver = %driver_id, tick = now, "ride assigned");
    Ok(OfferResponse::Assigned {
        driver: driver_id.clone(),
    })
}

fn reject_offer(
    world: &mut World,
    rider_entity: Entity,
    rider_id: &RiderId,
    driver_id: &DriverId,
) -> Result<OfferResponse, DispatchError> {
    let (pickup, mut rejected) = {
        let Some(request) = world.get::<RideRequest>(rider_entity) else {
            return Err(DispatchError::RideNotFound(rider_id.clone()));
        };
        (request.pickup, request.drivers_rejected.clone())
    };
    rejected.insert(driver_id.clone());

    match find_offer(world, pickup, &rejected) {
        Some(offer) => {
            if let Some(mut request) = world.get_mut::<RideRequest>(rider_entity) {
                request.drivers_rejected = rejected;
                request.offered_driver = Some(offer.driver.clone());
            }
            debug!(
                rider = %rider_id,
                rejected_by = %driver_id,
                driver = %offer.driver,
                distance = offer.distance,
                "ride re-offered"
            );
            Ok(OfferResponse::Reoffered(offer))
        }
        None => {
            let now = world.resource::<TickClock>().now();
            let taken = world.entity_mut(rider_entity).take::<RideRequest>();
            if let Some(mut request) = taken {
                request.drivers_rejected = rejected;
                request.offered_driver = None;
                request.status = RideStatus::Cancelled;
                world
                    .resource_mut::<DispatchTelemetry>()
                    .cancelled_rides
                    .push(CancelledRideRecord {
                        request,
                        cancelled_at: now,
                    });
            }
            warn!(
                rider = %rider_id,
                rejected_by = %driver_id,
                "all available drivers rejected the ride; request cancelled"
            );
            Ok(OfferResponse::Cancelled)
        }
    }
}
