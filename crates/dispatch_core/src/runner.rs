//! Tick runner: advances the clock and runs the movement schedule once per tick.
//!
//! Each tick increments [TickClock], resets [TickStats], runs the schedule, and
//! reports how many rides moved, completed, and remain active.

use bevy_ecs::prelude::{Resource, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};
use serde::Serialize;
use tracing::debug;

use crate::clock::TickClock;
use crate::ecs::RideRequest;
use crate::systems::movement::movement_system;

/// Per-tick counters written by the movement system.
#[derive(Debug, Default, Clone, Copy, Resource)]
pub struct TickStats {
    pub moved: usize,
    pub completed: usize,
}

/// Outcome of one `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    /// Assigned rides whose driver took a step this tick.
    pub moved: usize,
    /// Rides that reached dropoff this tick.
    pub completed: usize,
    /// Requests (waiting or assigned) still active after the tick.
    pub active: usize,
}

/// Builds the tick schedule: movement plus [apply_deferred] so completed
/// requests are removed once the whole pass has run.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((movement_system, apply_deferred).chain());
    schedule
}

/// Runs one tick.
pub fn run_tick(world: &mut World, schedule: &mut Schedule) -> TickReport {
    let tick = world.resource_mut::<TickClock>().advance();
    world.insert_resource(TickStats::default());
    schedule.run(world);

    let stats = *world.resource::<TickStats>();
    let active = world.query::<&RideRequest>().iter(world).count();
    debug!(
        tick,
        moved = stats.moved,
        completed = stats.completed,
        active,
        "tick advanced"
    );
    TickReport {
        tick,
        moved: stats.moved,
        completed: stats.completed,
        active,
    }
}

/// Number of requests currently assigned to a driver.
pub fn assigned_ride_count(world: &mut World) -> usize {
    world
        .query::<&RideRequest>()
        .iter(world)
        .filter(|request| request.is_assigned())
        .count()
}

/// Runs ticks until no assigned ride remains or `max_ticks` is reached.
/// Returns the number of ticks executed.
pub fn run_until_idle(world: &mut World, schedule: &mut Schedule, max_ticks: u64) -> u64 {
    let mut ticks = 0;
    while ticks < max_ticks && assigned_ride_count(world) > 0 {
        run_tick(world, schedule);
        ticks += 1;
    }
    ticks
}
