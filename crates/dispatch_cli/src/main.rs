mod cli;
mod config;
mod logging;
mod script;

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use dispatch_core::scenario::{build_scenario, run_scenario};
use dispatch_core::DispatchWorld;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Commands, SimulateArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.debug)?;

    match cli.command {
        Commands::Replay { script, snapshot } => run_replay(&script, snapshot),
        Commands::Simulate(args) => run_simulate(&args),
    }
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn run_replay(path: &Path, snapshot: bool) -> Result<()> {
    let commands = script::load_script(path)?;
    let mut world = DispatchWorld::new();
    let mut out = std::io::stdout().lock();

    let stats = script::replay(&mut world, &commands, &mut out)?;
    if snapshot {
        print_json(&mut out, &world.snapshot())?;
    }
    info!(
        applied = stats.applied,
        failed = stats.failed,
        tick = world.tick(),
        "replay finished"
    );
    Ok(())
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let params = config::resolve_params(args)?;
    let mut world = DispatchWorld::new();
    build_scenario(&mut world, &params)?;
    let summary = run_scenario(&mut world, &params);

    let mut out = std::io::stdout().lock();
    print_json(&mut out, &summary)?;
    if args.snapshot {
        print_json(&mut out, &world.snapshot())?;
    }
    Ok(())
}
