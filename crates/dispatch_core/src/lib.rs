pub mod clock;
pub mod directory;
pub mod dispatch;
pub mod ecs;
pub mod error;
pub mod grid;
pub mod matching;
pub mod runner;
pub mod scenario;
pub mod spatial;
pub mod systems;
pub mod telemetry;
pub mod world;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use dispatch::{Offer, OfferResponse};
pub use ecs::{DriverId, DriverStatus, RidePhase, RideRequest, RideStatus, RiderId};
pub use error::DispatchError;
pub use grid::Cell;
pub use runner::TickReport;
pub use telemetry::WorldSnapshot;
pub use world::DispatchWorld;
