use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::dispatch::OfferResponse;
use crate::ecs::{DriverId, RiderId};
use crate::error::DispatchError;
use crate::grid::{GRID_MAX, GRID_MIN};
use crate::scenario::params::ScenarioParams;
use crate::world::DispatchWorld;

const DROPOFF_SEED_OFFSET: u64 = 0xd0_0ff;
const RESPONSE_SEED_OFFSET: u64 = 0xcafe_babe;

/// Uniform random in-bounds coordinates.
pub fn random_coordinates<R: Rng>(rng: &mut R) -> (i64, i64) {
    let range = i64::from(GRID_MIN)..=i64::from(GRID_MAX);
    (rng.gen_range(range.clone()), rng.gen_range(range))
}

/// Register `num_drivers` drivers (`d0`, `d1`, ...) and `num_riders` riders
/// (`r0`, `r1`, ...) at seeded random cells.
pub fn build_scenario(
    world: &mut DispatchWorld,
    params: &ScenarioParams,
) -> Result<(), DispatchError> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    for i in 0..params.num_drivers {
        let (x, y) = random_coordinates(&mut rng);
        world.register_driver(format!("d{i}"), x, y)?;
    }
    for i in 0..params.num_riders {
        let (x, y) = random_coordinates(&mut rng);
        world.register_rider(format!("r{i}"), x, y)?;
    }
    info!(
        drivers = params.num_drivers,
        riders = params.num_riders,
        seed = params.seed,
        "scenario built"
    );
    Ok(())
}

/// Seeded accept/reject decisions for offered drivers.
#[derive(Debug)]
pub struct DriverResponsePolicy {
    accept_probability: f64,
    rng: StdRng,
}

impl DriverResponsePolicy {
    pub fn new(accept_probability: f64, seed: u64) -> Self {
        Self {
            accept_probability,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn accepts(&mut self) -> bool {
        self.rng.gen::<f64>() < self.accept_probability
    }
}

/// Counts from one [`run_scenario`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSummary {
    pub requests: usize,
    /// Requests that found no available driver.
    pub no_driver: usize,
    pub assigned: usize,
    pub rejections: usize,
    /// Requests dropped after every eligible driver rejected.
    pub cancelled: usize,
    pub completed: usize,
    pub ticks: u64,
}

/// Every rider requests a ride to a random dropoff; offers are answered by a
/// [`DriverResponsePolicy`] until assigned or cancelled. The world is then
/// advanced until idle or `max_ticks`.
pub fn run_scenario(world: &mut DispatchWorld, params: &ScenarioParams) -> ScenarioSummary {
    let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(DROPOFF_SEED_OFFSET));
    let mut policy = DriverResponsePolicy::new(
        params.accept_probability,
        params.seed.wrapping_add(RESPONSE_SEED_OFFSET),
    );
    let mut summary = ScenarioSummary::default();

    for rider in world.rider_ids() {
        let (x, y) = random_coordinates(&mut rng);
        summary.requests += 1;
        let offer = match world.request_ride(&rider, x, y) {
            Ok(offer) => offer,
            Err(DispatchError::NoDriverAvailable(_)) => {
                summary.no_driver += 1;
                continue;
            }
            Err(err) => {
                warn!(rider = %rider, error = %err, "ride request failed");
                continue;
            }
        };
        resolve_offer(world, &mut policy, &rider, offer.driver, &mut summary);
    }

    let completed_before = world.telemetry().completed_rides.len();
    summary.ticks = world.advance_until_idle(params.max_ticks);
    summary.completed = world.telemetry().completed_rides.len() - completed_before;

    info!(
        requests = summary.requests,
        assigned = summary.assigned,
        cancelled = summary.cancelled,
        completed = summary.completed,
        ticks = summary.ticks,
        "scenario finished"
    );
    summary
}

fn resolve_offer(
    world: &mut DispatchWorld,
    policy: &mut DriverResponsePolicy,
    rider: &RiderId,
    mut driver: DriverId,
    summary: &mut ScenarioSummary,
) {
    loop {
        let accepted = policy.accepts();
        match world.respond_to_offer(rider, &driver, accepted) {
            Ok(OfferResponse::Assigned { .. }) => {
                summary.assigned += 1;
                return;
            }
            Ok(OfferResponse::Reoffered(next)) => {
                summary.rejections += 1;
                driver = next.driver;
            }
            Ok(OfferResponse::Cancelled) => {
                summary.rejections += 1;
                summary.cancelled += 1;
                return;
            }
            Err(err) => {
                warn!(rider = %rider, driver = %driver, error = %err, "offer response failed");
                return;
            }
        }
    }
}
