//! Snapshot generation from simulation results.

use log::info;
use mld_data::{build_snapshot, read_runs, write_snapshot, BuildOptions};
use mld_store::MetricsConfig;
use mld_utils::dates::parse_date;
use std::path::Path;

/// Read the simulation CSV at `input`, build the snapshot and write it to
/// `output`.
pub fn run_build(
    input: &str,
    output: &str,
    start_date: &str,
    config: &MetricsConfig,
) -> anyhow::Result<()> {
    let options = BuildOptions {
        start_date: parse_date(start_date)?,
        station_count: config.station_count,
        bottleneck_threshold: config.bottleneck_threshold,
        ..BuildOptions::default()
    };
    let runs = read_runs(Path::new(input), options.station_count)?;
    if runs.is_empty() {
        anyhow::bail!("{} contains no usable simulation runs", input);
    }
    let snapshot = build_snapshot(&runs, &options);
    write_snapshot(&snapshot, Path::new(output))?;
    info!(
        "Build complete: {} runs from {} starting {}. Output: {}",
        runs.len(),
        input,
        options.start_date,
        output
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mld_core::Snapshot;

    const CSV: &str = "\
Producción final,Ocupación Est. 0,Inactividad Est. 0,Ocupación dispositivo de suministro,Tiempo promedio de reparación,Retraso promedio por cuellos de botella,Tasa de productos defectuosos
100,0.9,50,0.2,10,1,0.05
";

    #[test]
    fn builds_snapshot_file() {
        let dir = std::env::temp_dir().join(format!("mld-cmd-build-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("results.csv");
        let output = dir.join("out/dashboard_data.json");
        std::fs::write(&input, CSV).unwrap();

        let config = MetricsConfig {
            station_count: 1,
            ..MetricsConfig::default()
        };
        run_build(
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "2025-03-01",
            &config,
        )
        .unwrap();

        let snapshot =
            Snapshot::from_json_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(snapshot.daily_series[0].date.as_deref(), Some("2025-03-01"));
        assert_eq!(snapshot.station_records.len(), 1);
        assert!(snapshot.bottlenecks[0].is_bottleneck);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn rejects_bad_start_date() {
        let config = MetricsConfig::default();
        assert!(run_build("results.csv", "out.json", "01/03/2025", &config).is_err());
    }
}
