use serde::{Deserialize, Serialize};

/// Parameters for a random dispatch scenario.
///
/// Every field has a default, so a partial TOML table is enough to load one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub num_drivers: usize,
    pub num_riders: usize,
    /// Seed for placement, dropoffs and driver responses.
    pub seed: u64,
    /// Probability (0.0–1.0) that a driver accepts an offer.
    pub accept_probability: f64,
    /// Upper bound on ticks advanced after dispatch.
    pub max_ticks: u64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_drivers: 50,
            num_riders: 100,
            seed: 42,
            accept_probability: 0.8,
            max_ticks: 1_000,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_drivers(mut self, num_drivers: usize) -> Self {
        self.num_drivers = num_drivers;
        self
    }

    pub fn with_riders(mut self, num_riders: usize) -> Self {
        self.num_riders = num_riders;
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_accept_probability(mut self, probability: f64) -> Self {
        self.accept_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }
}
