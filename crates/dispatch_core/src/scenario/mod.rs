//! Scenario setup: seeded random drivers, riders and driver responses.
//!
//! Used by the simulate command and benchmarks to exercise dispatch and
//! movement at scale with reproducible results.

mod build;
mod params;

pub use build::{
    build_scenario, random_coordinates, run_scenario, DriverResponsePolicy, ScenarioSummary,
};
pub use params::ScenarioParams;
