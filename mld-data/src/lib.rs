//! Snapshot generation from simulation results.
//!
//! The production line simulator writes one CSV row per simulated run. This
//! crate turns those rows into the [`Snapshot`](mld_core::Snapshot) the
//! dashboard loads:
//!
//! - `simulation`: header-driven CSV parsing into [`SimulationRun`]s
//! - `builder`: daily series, per-station rows, period aggregates and the
//!   bottleneck analysis, plus writing the result to disk

pub mod builder;
pub mod simulation;

pub use builder::{build_snapshot, write_snapshot, BuildOptions, IDLE_HORIZON};
pub use simulation::{format_runs, parse_runs, read_runs, write_runs, SimulationRun};
