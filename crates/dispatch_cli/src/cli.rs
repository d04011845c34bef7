use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "dispatch",
    about = "Ride dispatch on a 100x100 grid",
    long_about = "Replays scripted dispatch commands against a fresh world, or runs a\n\
                  seeded random scenario and prints its summary as JSON."
)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a JSON script of commands, printing one JSON result per command
    Replay {
        /// Path to a JSON array of commands
        script: PathBuf,
        /// Print the final world snapshot after the script
        #[arg(long)]
        snapshot: bool,
    },
    /// Run a seeded random scenario
    Simulate(SimulateArgs),
}

/// Scenario flags; each one overrides the matching config file value.
#[derive(Debug, Default, Args)]
pub struct SimulateArgs {
    /// TOML file with scenario parameters
    #[arg(long, env = "DISPATCH_CONFIG")]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub drivers: Option<usize>,
    #[arg(long)]
    pub riders: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Probability (0.0–1.0) that a driver accepts an offer
    #[arg(long)]
    pub accept_probability: Option<f64>,
    #[arg(long)]
    pub max_ticks: Option<u64>,
    /// Print the final world snapshot after the summary
    #[arg(long)]
    pub snapshot: bool,
}
