use std::path::Path;

use anyhow::{bail, Context, Result};
use dispatch_core::scenario::ScenarioParams;

use crate::cli::SimulateArgs;

/// Read scenario parameters from a TOML file. Missing keys keep their defaults.
pub fn load_params(path: &Path) -> Result<ScenarioParams> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// File values (or defaults) with command-line flags applied on top.
pub fn resolve_params(args: &SimulateArgs) -> Result<ScenarioParams> {
    let mut params = match &args.config {
        Some(path) => load_params(path)?,
        None => ScenarioParams::default(),
    };

    if let Some(drivers) = args.drivers {
        params.num_drivers = drivers;
    }
    if let Some(riders) = args.riders {
        params.num_riders = riders;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    if let Some(probability) = args.accept_probability {
        params.accept_probability = probability;
    }
    if let Some(max_ticks) = args.max_ticks {
        params.max_ticks = max_ticks;
    }

    validate(&params)?;
    Ok(params)
}

fn validate(params: &ScenarioParams) -> Result<()> {
    if !(0.0..=1.0).contains(&params.accept_probability) {
        bail!(
            "accept_probability must be between 0 and 1, got {}",
            params.accept_probability
        );
    }
    Ok(())
}
