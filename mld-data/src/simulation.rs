//! Simulation result CSV parsing.
//!
//! Columns are located by header name, so their order does not matter and
//! extra columns are ignored. `Tiempo inactividad por fallos` is optional and
//! reads as zero when absent.
//!
//! # CSV Format
//!
//! ```text
//! Producción final,Ocupación Est. 0,...,Ocupación Est. 5,Inactividad Est. 0,...,Inactividad Est. 5,Tiempo inactividad por fallos,Ocupación dispositivo de suministro,Tiempo promedio de reparación,Retraso promedio por cuellos de botella,Tasa de productos defectuosos
//! 1520,0.81,...,0.44,120.5,...,310.0,42.7,0.23,12.4,3.1,0.042
//! ```

use anyhow::{anyhow, Context};
use csv::StringRecord;
use log::{info, warn};
use std::path::Path;

pub const PRODUCTION: &str = "Producción final";
pub const FAILURE_DOWNTIME: &str = "Tiempo inactividad por fallos";
pub const SUPPLY_OCCUPANCY: &str = "Ocupación dispositivo de suministro";
pub const REPAIR_TIME: &str = "Tiempo promedio de reparación";
pub const BOTTLENECK_DELAY: &str = "Retraso promedio por cuellos de botella";
pub const DEFECT_RATE: &str = "Tasa de productos defectuosos";

fn station_occupancy_header(station: usize) -> String {
    format!("Ocupación Est. {}", station)
}

fn station_idle_header(station: usize) -> String {
    format!("Inactividad Est. {}", station)
}

/// One simulated run, i.e. one dashboard day.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub produced: f64,
    /// Occupancy fraction per station.
    pub station_occupancy: Vec<f64>,
    /// Idle time per station in simulation time units (not a fraction).
    pub station_idle: Vec<f64>,
    /// Total time spent repairing failed stations.
    pub failure_downtime: f64,
    pub supply_occupancy: f64,
    pub avg_repair_time: f64,
    pub avg_delay: f64,
    pub defect_rate: f64,
}

/// Column positions resolved from the header row.
struct Columns {
    produced: usize,
    occupancy: Vec<usize>,
    idle: Vec<usize>,
    failure_downtime: Option<usize>,
    supply_occupancy: usize,
    repair_time: usize,
    delay: usize,
    defect_rate: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord, station_count: usize) -> anyhow::Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| anyhow!("missing column {:?}", name))
        };
        Ok(Self {
            produced: find(PRODUCTION)?,
            occupancy: (0..station_count)
                .map(|i| find(&station_occupancy_header(i)))
                .collect::<anyhow::Result<_>>()?,
            idle: (0..station_count)
                .map(|i| find(&station_idle_header(i)))
                .collect::<anyhow::Result<_>>()?,
            failure_downtime: find(FAILURE_DOWNTIME).ok(),
            supply_occupancy: find(SUPPLY_OCCUPANCY)?,
            repair_time: find(REPAIR_TIME)?,
            delay: find(BOTTLENECK_DELAY)?,
            defect_rate: find(DEFECT_RATE)?,
        })
    }
}

/// Numeric cell; blank or non-numeric cells read as zero.
fn number(record: &StringRecord, index: usize) -> f64 {
    record
        .get(index)
        .and_then(|cell| cell.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parse simulation runs from CSV text with a header row.
///
/// Rows whose production cell is not numeric are skipped. A missing column
/// fails the whole parse.
pub fn parse_runs(csv_data: &str, station_count: usize) -> anyhow::Result<Vec<SimulationRun>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    let columns = Columns::resolve(rdr.headers()?, station_count)?;

    let mut runs = Vec::new();
    let mut skipped = 0u32;
    for (line, result) in rdr.records().enumerate() {
        let r = result?;
        let produced = match r.get(columns.produced).map(str::trim).map(str::parse::<f64>) {
            Some(Ok(v)) => v,
            _ => {
                warn!("simulation: row {} has no numeric production, skipping", line + 1);
                skipped += 1;
                continue;
            }
        };
        runs.push(SimulationRun {
            produced,
            station_occupancy: columns.occupancy.iter().map(|i| number(&r, *i)).collect(),
            station_idle: columns.idle.iter().map(|i| number(&r, *i)).collect(),
            failure_downtime: columns
                .failure_downtime
                .map(|i| number(&r, i))
                .unwrap_or(0.0),
            supply_occupancy: number(&r, columns.supply_occupancy),
            avg_repair_time: number(&r, columns.repair_time),
            avg_delay: number(&r, columns.delay),
            defect_rate: number(&r, columns.defect_rate),
        });
    }
    info!("simulation: parsed {} runs, skipped {}", runs.len(), skipped);
    Ok(runs)
}

/// Read and parse a simulation CSV file.
pub fn read_runs(path: &Path, station_count: usize) -> anyhow::Result<Vec<SimulationRun>> {
    let csv_data = std::fs::read_to_string(path)
        .with_context(|| format!("reading simulation results from {}", path.display()))?;
    parse_runs(&csv_data, station_count)
}

/// Header row of the run table, in the order the simulator writes it.
pub fn headers(station_count: usize) -> Vec<String> {
    let mut headers = vec![PRODUCTION.to_string()];
    headers.extend((0..station_count).map(station_occupancy_header));
    headers.extend((0..station_count).map(station_idle_header));
    headers.extend(
        [
            FAILURE_DOWNTIME,
            SUPPLY_OCCUPANCY,
            REPAIR_TIME,
            BOTTLENECK_DELAY,
            DEFECT_RATE,
        ]
        .map(String::from),
    );
    headers
}

fn station_cell(values: &[f64], station: usize) -> String {
    values.get(station).copied().unwrap_or(0.0).to_string()
}

/// Serialize runs as CSV with the full header row.
pub fn format_runs(runs: &[SimulationRun], station_count: usize) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(headers(station_count))?;
    for run in runs {
        let mut record = vec![run.produced.to_string()];
        record.extend((0..station_count).map(|i| station_cell(&run.station_occupancy, i)));
        record.extend((0..station_count).map(|i| station_cell(&run.station_idle, i)));
        record.extend(
            [
                run.failure_downtime,
                run.supply_occupancy,
                run.avg_repair_time,
                run.avg_delay,
                run.defect_rate,
            ]
            .map(|v| v.to_string()),
        );
        wtr.write_record(&record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| anyhow!("flushing CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write runs to `path` as CSV, creating missing parent directories.
pub fn write_runs(runs: &[SimulationRun], station_count: usize, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, format_runs(runs, station_count)?)
        .with_context(|| format!("writing simulation results to {}", path.display()))?;
    info!("simulation: wrote {} runs to {}", runs.len(), path.display());
    Ok(())
}
