use std::collections::BTreeSet;
use std::fmt;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::grid::Cell;

/// Externally assigned driver identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(String);

impl DriverId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DriverId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DriverId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Externally assigned rider identifier. Also keys the rider's ride request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiderId(String);

impl RiderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RiderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RiderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    OnTrip,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Driver {
    pub id: DriverId,
    pub status: DriverStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Component)]
pub struct Rider {
    pub id: RiderId,
    /// Where the rider's last ride (or registration) left them.
    pub last_dropoff: Cell,
}

/// Current cell of a driver or rider. For riders this is the pickup origin of the next ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Position(pub Cell);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    /// An offer is outstanding; no driver has committed yet.
    Waiting,
    Assigned,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RidePhase {
    ToPickup,
    ToDropoff,
    Completed,
}

/// The active ride request of a rider, stored on the rider entity.
///
/// `phase` is only meaningful once `status` is [`RideStatus::Assigned`].
/// Timestamps are tick counts from [`crate::clock::TickClock`].
#[derive(Debug, Clone, PartialEq, Eq, Component, Serialize)]
pub struct RideRequest {
    pub rider: RiderId,
    pub pickup: Cell,
    pub dropoff: Cell,
    pub status: RideStatus,
    pub phase: RidePhase,
    /// Present iff `status` is `Assigned`.
    pub assigned_driver: Option<DriverId>,
    /// Driver whose response is pending while `status` is `Waiting`.
    pub offered_driver: Option<DriverId>,
    /// Grows monotonically for the life of the request.
    pub drivers_rejected: BTreeSet<DriverId>,
    pub requested_at: u64,
    pub matched_at: Option<u64>,
    pub pickup_at: Option<u64>,
}

impl RideRequest {
    pub fn new(
        rider: RiderId,
        pickup: Cell,
        dropoff: Cell,
        offered_driver: DriverId,
        requested_at: u64,
    ) -> Self {
        Self {
            rider,
            pickup,
            dropoff,
            status: RideStatus::Waiting,
            phase: RidePhase::ToPickup,
            assigned_driver: None,
            offered_driver: Some(offered_driver),
            drivers_rejected: BTreeSet::new(),
            requested_at,
            matched_at: None,
            pickup_at: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.status == RideStatus::Assigned
    }
}
