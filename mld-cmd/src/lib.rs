//! Command implementations for MLD CLI.
//!
//! Provides subcommands for simulating the line, turning the results into a
//! dashboard snapshot, and inspecting or exporting the metrics derived from
//! one.

use anyhow::Context;
use clap::Subcommand;
use log::error;
use mld_core::SnapshotSource;
use mld_sim::SimulationConfig;
use mld_store::{MetricsConfig, MetricsStore};

pub mod build;
pub mod export;
pub mod simulate;
pub mod summary;

#[derive(Subcommand)]
pub enum Command {
    /// Simulate the production line and write one CSV row per run
    Simulate {
        /// Output path for the results CSV
        #[arg(short = 'o', long, default_value = "data/resultados.csv")]
        output: String,

        /// Number of independent runs
        #[arg(short = 'n', long, default_value_t = 100)]
        runs: usize,

        /// Simulated time units per run
        #[arg(long, default_value_t = 5000.0)]
        horizon: f64,

        /// Seed for reproducible results
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Build a dashboard snapshot from a simulation results CSV
    Build {
        /// Simulation results CSV, one row per run
        #[arg(short = 'i', long)]
        input: String,

        /// Output path for the snapshot JSON (`.gz` to compress)
        #[arg(short = 'o', long, default_value = mld_core::source::DEFAULT_SNAPSHOT_PATH)]
        output: String,

        /// Date of the first run (YYYY-MM-DD)
        #[arg(long, default_value = "2025-01-01")]
        start_date: String,

        /// JSON file overriding metric thresholds and windows
        #[arg(short = 'c', long)]
        config: Option<String>,
    },

    /// Print the headline metrics of a snapshot
    Summary {
        /// Snapshot file path or http(s) URL
        #[arg(short = 's', long, default_value = mld_core::source::DEFAULT_SNAPSHOT_PATH)]
        snapshot: String,

        /// `daily` or a period series name such as `weekly`
        #[arg(short = 'g', long, default_value = "daily")]
        granularity: String,

        /// `all` or a station index
        #[arg(long, default_value = "all")]
        station: String,

        /// JSON file overriding metric thresholds and windows
        #[arg(short = 'c', long)]
        config: Option<String>,
    },

    /// Write every chart payload of a snapshot as one JSON document
    Export {
        /// Snapshot file path or http(s) URL
        #[arg(short = 's', long, default_value = mld_core::source::DEFAULT_SNAPSHOT_PATH)]
        snapshot: String,

        /// Output path for the chart payloads JSON
        #[arg(short = 'o', long)]
        output: String,

        /// `daily` or a period series name such as `weekly`
        #[arg(short = 'g', long, default_value = "daily")]
        granularity: String,

        /// `all` or a station index
        #[arg(long, default_value = "all")]
        station: String,

        /// JSON file overriding metric thresholds and windows
        #[arg(short = 'c', long)]
        config: Option<String>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Simulate {
            output,
            runs,
            horizon,
            seed,
        } => {
            let config = SimulationConfig {
                runs,
                horizon,
                seed,
                ..SimulationConfig::default()
            };
            simulate::run_simulate(&config, &output)
        }
        Command::Build {
            input,
            output,
            start_date,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            build::run_build(&input, &output, &start_date, &config)
        }
        Command::Summary {
            snapshot,
            granularity,
            station,
            config,
        } => {
            let store = open_store(&snapshot, config.as_deref(), &granularity, &station).await?;
            summary::run_summary(&store)
        }
        Command::Export {
            snapshot,
            output,
            granularity,
            station,
            config,
        } => {
            let store = open_store(&snapshot, config.as_deref(), &granularity, &station).await?;
            export::run_export(store, &output)
        }
    }
}

/// Defaults, or the overrides in `path`.
pub fn load_config(path: Option<&str>) -> anyhow::Result<MetricsConfig> {
    match path {
        Some(path) => MetricsConfig::from_json_file(path)
            .with_context(|| format!("reading metrics config {}", path)),
        None => Ok(MetricsConfig::default()),
    }
}

/// Load the snapshot at `location` and apply the requested selection.
///
/// Unlike the interactive dashboard, a rejected selection is an error here.
pub async fn open_store(
    location: &str,
    config: Option<&str>,
    granularity: &str,
    station: &str,
) -> anyhow::Result<MetricsStore> {
    let mut store = MetricsStore::with_config(load_config(config)?);
    let source = SnapshotSource::parse(location);
    if let Err(err) = store.load(&source).await {
        error!("{}: {}", source, err);
        anyhow::bail!("{}: {}", err.user_message(), err);
    }
    select(&mut store, granularity, station)?;
    Ok(store)
}

fn select(store: &mut MetricsStore, granularity: &str, station: &str) -> anyhow::Result<()> {
    if !store.set_time_granularity(granularity) {
        let known = store
            .snapshot()
            .map(|s| s.period_names().join(", "))
            .unwrap_or_default();
        anyhow::bail!(
            "unknown granularity {:?} (expected daily or one of: {})",
            granularity,
            known
        );
    }
    if !store.set_station_filter(station) {
        anyhow::bail!(
            "invalid station {:?} (expected all or 0..{})",
            station,
            store.config().station_count
        );
    }
    Ok(())
}
