//! Tunable constants of the derivation layer.
//!
//! The defaults reproduce the production dashboard. A JSON file with any
//! subset of the fields can override them.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Heuristic thresholds and window sizes used by the queries and charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Stations are numbered `0..station_count`.
    pub station_count: usize,
    /// Average occupancy above which a station is flagged as a bottleneck.
    pub bottleneck_threshold: f64,
    /// Reference line drawn on the plant efficiency chart.
    pub efficiency_reference: f64,
    /// Efficiency is `1 - defect_rate - avg_delay / efficiency_delay_divisor`.
    pub efficiency_delay_divisor: f64,
    /// Number of most recent dates kept by the station status series.
    pub status_window: usize,
    /// Number of most recent days kept by the plant efficiency series.
    pub efficiency_window: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            station_count: 6,
            bottleneck_threshold: 0.7,
            efficiency_reference: 0.7,
            efficiency_delay_divisor: 10.0,
            status_window: 10,
            efficiency_window: 30,
        }
    }
}

impl MetricsConfig {
    /// Read overrides from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let config: MetricsConfig = serde_json::from_str(raw)?;
        if config.efficiency_delay_divisor == 0.0 {
            anyhow::bail!("efficiency_delay_divisor must be non-zero");
        }
        Ok(config)
    }
}
