//! Scripted replay: a JSON array of commands applied to one world in order.
//!
//! Each command produces one JSON line with `"status": "ok"` or
//! `"status": "error"`. A failing command does not stop the script.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use dispatch_core::ecs::{DriverId, RiderId};
use dispatch_core::{DispatchError, DispatchWorld};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptCommand {
    RegisterDriver { driver_id: DriverId, x: i64, y: i64 },
    RegisterRider { rider_id: RiderId, x: i64, y: i64 },
    RemoveDriver { driver_id: DriverId },
    RemoveRider { rider_id: RiderId },
    SetDriverOffline { driver_id: DriverId },
    SetDriverOnline { driver_id: DriverId },
    RequestRide {
        rider_id: RiderId,
        dropoff_x: i64,
        dropoff_y: i64,
    },
    Respond {
        rider_id: RiderId,
        driver_id: DriverId,
        accepted: bool,
    },
    /// Advance `count` ticks (default 1).
    Tick {
        #[serde(default = "one")]
        count: u64,
    },
    Snapshot,
}

fn one() -> u64 {
    1
}

impl ScriptCommand {
    fn op(&self) -> &'static str {
        match self {
            Self::RegisterDriver { .. } => "register_driver",
            Self::RegisterRider { .. } => "register_rider",
            Self::RemoveDriver { .. } => "remove_driver",
            Self::RemoveRider { .. } => "remove_rider",
            Self::SetDriverOffline { .. } => "set_driver_offline",
            Self::SetDriverOnline { .. } => "set_driver_online",
            Self::RequestRide { .. } => "request_ride",
            Self::Respond { .. } => "respond",
            Self::Tick { .. } => "tick",
            Self::Snapshot => "snapshot",
        }
    }
}

/// Counts from one replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub failed: usize,
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptCommand>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse script: {}", path.display()))
}

/// Apply one command; the JSON result carries everything the caller needs.
pub fn apply(world: &mut DispatchWorld, command: &ScriptCommand) -> Result<Value, DispatchError> {
    let result = match command {
        ScriptCommand::RegisterDriver { driver_id, x, y } => {
            world.register_driver(driver_id.clone(), *x, *y)?;
            json!({ "driver_id": driver_id })
        }
        ScriptCommand::RegisterRider { rider_id, x, y } => {
            world.register_rider(rider_id.clone(), *x, *y)?;
            json!({ "rider_id": rider_id })
        }
        ScriptCommand::RemoveDriver { driver_id } => {
            world.remove_driver(driver_id)?;
            json!({ "driver_id": driver_id })
        }
        ScriptCommand::RemoveRider { rider_id } => {
            world.remove_rider(rider_id)?;
            json!({ "rider_id": rider_id })
        }
        ScriptCommand::SetDriverOffline { driver_id } => {
            world.set_driver_offline(driver_id)?;
            json!({ "driver_id": driver_id })
        }
        ScriptCommand::SetDriverOnline { driver_id } => {
            world.set_driver_online(driver_id)?;
            json!({ "driver_id": driver_id })
        }
        ScriptCommand::RequestRide {
            rider_id,
            dropoff_x,
            dropoff_y,
        } => {
            let offer = world.request_ride(rider_id, *dropoff_x, *dropoff_y)?;
            json!({ "rider_id": rider_id, "offer": offer })
        }
        ScriptCommand::Respond {
            rider_id,
            driver_id,
            accepted,
        } => {
            let response = world.respond_to_offer(rider_id, driver_id, *accepted)?;
            json!({ "rider_id": rider_id, "response": response })
        }
        ScriptCommand::Tick { count } => {
            let reports: Vec<_> = (0..*count).map(|_| world.advance()).collect();
            json!({ "ticks": reports })
        }
        ScriptCommand::Snapshot => json!({ "snapshot": world.snapshot() }),
    };
    Ok(result)
}

/// Apply every command in order, writing one JSON line per command to `out`.
pub fn replay<W: Write>(
    world: &mut DispatchWorld,
    commands: &[ScriptCommand],
    out: &mut W,
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for command in commands {
        let line = match apply(world, command) {
            Ok(result) => {
                stats.applied += 1;
                json!({ "op": command.op(), "status": "ok", "result": result })
            }
            Err(err) => {
                stats.failed += 1;
                warn!(op = command.op(), error = %err, "script command failed");
                json!({ "op": command.op(), "status": "error", "error": err.to_string() })
            }
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
    }
    Ok(stats)
}
