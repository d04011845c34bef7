//! Errors returned by dispatch operations.
//!
//! Every operation validates before it mutates, so an `Err` always means the
//! world is unchanged.

use thiserror::Error;

use crate::ecs::{DriverId, RiderId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("location ({x}, {y}) is outside the grid; coordinates must be between 0 and 99")]
    InvalidLocation { x: i64, y: i64 },

    #[error("driver {0} not found")]
    DriverNotFound(DriverId),

    #[error("rider {0} not found")]
    RiderNotFound(RiderId),

    #[error("ride request for rider {0} not found")]
    RideNotFound(RiderId),

    #[error("no available drivers found for rider {0}")]
    NoDriverAvailable(RiderId),

    #[error("ride for rider {0} is already assigned")]
    AlreadyAssigned(RiderId),

    #[error("ride for rider {rider} is offered to driver {offered}, not driver {responded}")]
    OfferMismatch {
        rider: RiderId,
        offered: DriverId,
        responded: DriverId,
    },

    #[error("driver {0} is no longer available")]
    DriverUnavailable(DriverId),

    #[error("driver {0} is on a trip")]
    DriverOnTrip(DriverId),

    #[error("rider {0} is on a trip")]
    RiderOnTrip(RiderId),
}
