//! Run the line simulation and write the results table.

use log::info;
use mld_data::write_runs;
use mld_sim::{simulate, SimulationConfig};
use std::path::Path;

pub fn run_simulate(config: &SimulationConfig, output: &str) -> anyhow::Result<()> {
    let runs = simulate(config)?;
    write_runs(&runs, config.station_count(), Path::new(output))?;
    info!(
        "Simulation complete: {} runs of {} time units. Output: {}",
        runs.len(),
        config.horizon,
        output
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mld_data::read_runs;
    use mld_data::simulation::FAILURE_DOWNTIME;

    #[test]
    fn writes_a_table_the_builder_reads() {
        let dir = std::env::temp_dir().join(format!("mld-cmd-simulate-{}", std::process::id()));
        let output = dir.join("data/resultados.csv");
        let config = SimulationConfig {
            runs: 4,
            horizon: 400.0,
            seed: Some(21),
            ..SimulationConfig::default()
        };
        run_simulate(&config, output.to_str().unwrap()).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.lines().next().unwrap().contains(FAILURE_DOWNTIME));
        let runs = read_runs(&output, 6).unwrap();
        assert_eq!(runs.len(), 4);
        assert_eq!(runs, simulate(&config).unwrap());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn rejects_short_line() {
        let config = SimulationConfig {
            failure_probabilities: vec![0.1],
            ..SimulationConfig::default()
        };
        assert!(run_simulate(&config, "unused.csv").is_err());
    }
}
