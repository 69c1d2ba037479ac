//! Discrete-event simulation of the production line.
//!
//! Products arrive with exponential inter-arrival times and pass through the
//! sequential stations in order, then through both stations of the final
//! parallel pair, starting with whichever has the shorter queue. Every
//! station draws one unit of raw material per product and waits for one of
//! the shared restockers when its stock runs out. Every few products a
//! station may fail and hold its product until repaired. Finished products
//! are rejected with a fixed probability.
//!
//! Each run produces one [`SimulationRun`], the row format the snapshot
//! builder reads.
//!
//! # Usage
//!
//! ```rust
//! use mld_sim::{simulate, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     runs: 2,
//!     horizon: 500.0,
//!     seed: Some(7),
//!     ..SimulationConfig::default()
//! };
//! let runs = simulate(&config).unwrap();
//! assert_eq!(runs.len(), 2);
//! assert_eq!(runs[0].station_occupancy.len(), 6);
//! ```

mod line;

use anyhow::anyhow;
use log::{debug, info};
use mld_data::SimulationRun;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Exp, Normal};

/// Parameters of the line and of the experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of independent runs.
    pub runs: usize,
    /// Simulated time units per run.
    pub horizon: f64,
    /// Fixed seed for reproducible runs; fresh entropy when `None`.
    pub seed: Option<u64>,
    /// Failure probability per station; its length is the station count.
    /// The last two stations form the parallel pair.
    pub failure_probabilities: Vec<f64>,
    /// A station may fail after every `failure_check_interval` products.
    pub failure_check_interval: u64,
    pub mean_interarrival: f64,
    pub process_time_mean: f64,
    pub process_time_std: f64,
    pub mean_repair_time: f64,
    pub restock_time_mean: f64,
    pub restock_time_std: f64,
    /// Raw material units a station holds after restocking.
    pub stock_capacity: u32,
    /// Restocking devices shared by all stations.
    pub restockers: usize,
    pub reject_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            horizon: 5000.0,
            seed: None,
            failure_probabilities: vec![0.02, 0.01, 0.05, 0.15, 0.07, 0.06],
            failure_check_interval: 5,
            mean_interarrival: 3.0,
            process_time_mean: 4.0,
            process_time_std: 1.0,
            mean_repair_time: 3.0,
            restock_time_mean: 2.0,
            restock_time_std: 0.5,
            stock_capacity: 25,
            restockers: 3,
            reject_probability: 0.05,
        }
    }
}

impl SimulationConfig {
    pub fn station_count(&self) -> usize {
        self.failure_probabilities.len()
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.station_count() < 2 {
            anyhow::bail!("the line needs at least two stations");
        }
        if !(self.horizon > 0.0) {
            anyhow::bail!("horizon must be positive, got {}", self.horizon);
        }
        if self.stock_capacity == 0 || self.restockers == 0 || self.failure_check_interval == 0 {
            anyhow::bail!("stock capacity, restockers and failure interval must be non-zero");
        }
        Ok(())
    }
}

/// Sampling distributions derived from a config.
pub(crate) struct Distributions {
    pub interarrival: Exp<f64>,
    pub process: Normal<f64>,
    pub repair: Exp<f64>,
    pub restock: Normal<f64>,
}

impl Distributions {
    fn new(config: &SimulationConfig) -> anyhow::Result<Self> {
        let exp = |mean: f64| {
            Exp::new(1.0 / mean).map_err(|e| anyhow!("invalid exponential mean {}: {}", mean, e))
        };
        let normal = |mean: f64, std: f64| {
            Normal::new(mean, std)
                .map_err(|e| anyhow!("invalid normal ({}, {}): {}", mean, std, e))
        };
        Ok(Self {
            interarrival: exp(config.mean_interarrival)?,
            process: normal(config.process_time_mean, config.process_time_std)?,
            repair: exp(config.mean_repair_time)?,
            restock: normal(config.restock_time_mean, config.restock_time_std)?,
        })
    }
}

/// Run the experiment and return one row per run.
pub fn simulate(config: &SimulationConfig) -> anyhow::Result<Vec<SimulationRun>> {
    config.validate()?;
    let distributions = Distributions::new(config)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let runs: Vec<SimulationRun> = (0..config.runs)
        .map(|i| {
            let run = line::Line::new(config, &distributions, &mut rng).run();
            debug!(
                "simulation: run {} produced {} (defect rate {:.3})",
                i, run.produced, run.defect_rate
            );
            run
        })
        .collect();
    info!(
        "simulation: {} runs of {} time units on {} stations",
        runs.len(),
        config.horizon,
        config.station_count()
    );
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short(seed: u64) -> SimulationConfig {
        SimulationConfig {
            runs: 3,
            horizon: 1000.0,
            seed: Some(seed),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn same_seed_same_runs() {
        assert_eq!(simulate(&short(11)).unwrap(), simulate(&short(11)).unwrap());
    }

    #[test]
    fn rows_are_consistent() {
        let config = short(3);
        for run in simulate(&config).unwrap() {
            assert!(run.produced > 0.0);
            assert_eq!(run.station_occupancy.len(), 6);
            for (occupancy, idle) in run.station_occupancy.iter().zip(&run.station_idle) {
                assert!((0.0..=1.0).contains(occupancy));
                assert!((idle - (config.horizon - occupancy * config.horizon)).abs() < 1e-6);
            }
            assert!((0.0..=1.0).contains(&run.defect_rate));
            assert!((0.0..=1.0).contains(&run.supply_occupancy));
        }
    }

    #[test]
    fn no_failures_means_no_repairs() {
        let config = SimulationConfig {
            failure_probabilities: vec![0.0; 6],
            ..short(5)
        };
        for run in simulate(&config).unwrap() {
            assert_eq!(run.failure_downtime, 0.0);
            assert_eq!(run.avg_repair_time, 0.0);
        }
    }

    #[test]
    fn certain_failures_are_repaired() {
        let config = SimulationConfig {
            failure_probabilities: vec![1.0; 6],
            ..short(5)
        };
        for run in simulate(&config).unwrap() {
            assert!(run.failure_downtime > 0.0);
            assert!(run.avg_repair_time > 0.0);
        }
    }

    #[test]
    fn every_product_rejected_keeps_defect_rate_finite() {
        let config = SimulationConfig {
            reject_probability: 1.0,
            ..short(9)
        };
        for run in simulate(&config).unwrap() {
            assert_eq!(run.produced, 0.0);
            assert_eq!(run.defect_rate, 0.0);
        }
    }

    #[test]
    fn small_stock_forces_restocking() {
        let config = SimulationConfig {
            stock_capacity: 1,
            ..short(13)
        };
        for run in simulate(&config).unwrap() {
            assert!(run.supply_occupancy > 0.0);
            assert!(run.avg_delay > 0.0);
        }
    }

    #[test]
    fn rejects_invalid_configs() {
        let one_station = SimulationConfig {
            failure_probabilities: vec![0.1],
            ..short(1)
        };
        assert!(simulate(&one_station).is_err());
        let bad_spread = SimulationConfig {
            process_time_std: -1.0,
            ..short(1)
        };
        assert!(simulate(&bad_spread).is_err());
        let no_time = SimulationConfig {
            horizon: 0.0,
            ..short(1)
        };
        assert!(simulate(&no_time).is_err());
    }
}
