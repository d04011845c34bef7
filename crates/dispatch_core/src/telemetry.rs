//! Telemetry / KPIs: records finished ride requests and builds world snapshots.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::ecs::{DriverId, DriverStatus, RideRequest, RideStatus, RiderId};
use crate::grid::Cell;

/// One completed ride, recorded on the tick the driver reaches dropoff.
/// Timestamps are ticks; use the helper methods for derived KPIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedRideRecord {
    pub rider: RiderId,
    pub driver: DriverId,
    pub pickup: Cell,
    pub dropoff: Cell,
    pub requested_at: u64,
    pub matched_at: u64,
    pub pickup_at: u64,
    pub completed_at: u64,
    /// Drivers that turned the request down before it was accepted.
    pub rejections: usize,
}

impl CompletedRideRecord {
    /// Ticks from request to driver acceptance.
    pub fn time_to_match(&self) -> u64 {
        self.matched_at.saturating_sub(self.requested_at)
    }

    /// Ticks from acceptance to pickup.
    pub fn time_to_pickup(&self) -> u64 {
        self.pickup_at.saturating_sub(self.matched_at)
    }

    /// Ticks from pickup to dropoff.
    pub fn trip_duration(&self) -> u64 {
        self.completed_at.saturating_sub(self.pickup_at)
    }
}

/// A request dropped after every reachable driver rejected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelledRideRecord {
    pub request: RideRequest,
    pub cancelled_at: u64,
}

/// Collects dispatch telemetry for the lifetime of a world.
#[derive(Debug, Default, Resource)]
pub struct DispatchTelemetry {
    pub completed_rides: Vec<CompletedRideRecord>,
    pub cancelled_rides: Vec<CancelledRideRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverSnapshot {
    pub id: DriverId,
    pub location: Cell,
    pub status: DriverStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiderSnapshot {
    pub id: RiderId,
    pub location: Cell,
    pub last_dropoff: Cell,
}

/// Aggregated counts at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotCounts {
    pub drivers_available: usize,
    pub drivers_on_trip: usize,
    pub drivers_offline: usize,
    pub rides_waiting: usize,
    pub rides_assigned: usize,
}

impl SnapshotCounts {
    pub fn add_driver(&mut self, status: DriverStatus) {
        match status {
            DriverStatus::Available => self.drivers_available += 1,
            DriverStatus::OnTrip => self.drivers_on_trip += 1,
            DriverStatus::Offline => self.drivers_offline += 1,
        }
    }

    pub fn add_ride(&mut self, status: RideStatus) {
        match status {
            RideStatus::Waiting => self.rides_waiting += 1,
            RideStatus::Assigned => self.rides_assigned += 1,
            // Finished requests leave the world on the call that finishes them.
            RideStatus::Cancelled | RideStatus::Completed => {}
        }
    }
}

/// Full world state: drivers, riders and active requests sorted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldSnapshot {
    pub current_tick: u64,
    pub counts: SnapshotCounts,
    pub drivers: Vec<DriverSnapshot>,
    pub riders: Vec<RiderSnapshot>,
    pub ride_requests: Vec<RideRequest>,
}

impl WorldSnapshot {
    pub fn new(
        current_tick: u64,
        mut drivers: Vec<DriverSnapshot>,
        mut riders: Vec<RiderSnapshot>,
        mut ride_requests: Vec<RideRequest>,
    ) -> Self {
        drivers.sort_by(|a, b| a.id.cmp(&b.id));
        riders.sort_by(|a, b| a.id.cmp(&b.id));
        ride_requests.sort_by(|a, b| a.rider.cmp(&b.rider));

        let mut counts = SnapshotCounts::default();
        for driver in &drivers {
            counts.add_driver(driver.status);
        }
        for request in &ride_requests {
            counts.add_ride(request.status);
        }

        Self {
            current_tick,
            counts,
            drivers,
            riders,
            ride_requests,
        }
    }
}
