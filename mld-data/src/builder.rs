//! Snapshot assembly.
//!
//! Run *i* is dated `start_date + i` days. Period series group runs by ISO
//! week number, month, quarter and year; each group becomes one
//! [`PeriodRecord`] and groups are emitted in ascending key order.

use crate::simulation::SimulationRun;
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use mld_core::{BottleneckRecord, DailyRecord, PeriodRecord, Snapshot, StationRecord};
use mld_utils::dates::{format_date, iso_week, quarter, run_date};
use mld_utils::stats::mean;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Simulated time units per run; idle times are divided by this to get a
/// fraction.
pub const IDLE_HORIZON: f64 = 5000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub start_date: NaiveDate,
    pub station_count: usize,
    /// Mean occupancy above which a station is flagged as a bottleneck.
    pub bottleneck_threshold: f64,
    pub idle_horizon: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            station_count: 6,
            bottleneck_threshold: 0.7,
            idle_horizon: IDLE_HORIZON,
        }
    }
}

fn week_key(date: &NaiveDate) -> i64 {
    i64::from(iso_week(date))
}

fn month_key(date: &NaiveDate) -> i64 {
    i64::from(date.month())
}

fn quarter_key(date: &NaiveDate) -> i64 {
    i64::from(quarter(date))
}

fn year_key(date: &NaiveDate) -> i64 {
    i64::from(date.year())
}

/// Period series and the key each run falls into.
const PERIODS: [(&str, fn(&NaiveDate) -> i64); 4] = [
    ("weekly", week_key),
    ("monthly", month_key),
    ("quarterly", quarter_key),
    ("yearly", year_key),
];

/// Build the dashboard snapshot for `runs`.
pub fn build_snapshot(runs: &[SimulationRun], options: &BuildOptions) -> Snapshot {
    let dates: Vec<NaiveDate> = (0..runs.len())
        .map(|i| run_date(&options.start_date, i))
        .collect();

    let daily_series = runs
        .iter()
        .zip(&dates)
        .map(|(run, date)| DailyRecord {
            date: Some(format_date(date)),
            total_produced: Some(run.produced.trunc()),
            defect_rate: run.defect_rate,
            avg_repair_time: run.avg_repair_time,
            avg_delay: run.avg_delay,
            supply_occupancy: run.supply_occupancy,
        })
        .collect();

    let station_records = runs
        .iter()
        .zip(&dates)
        .flat_map(|(run, date)| {
            let date = format_date(date);
            (0..options.station_count).map(move |station| StationRecord {
                station_id: Some(station as i64),
                date: Some(date.clone()),
                occupancy_fraction: run.station_occupancy.get(station).copied().unwrap_or(0.0),
                idle_fraction: run.station_idle.get(station).copied().unwrap_or(0.0)
                    / options.idle_horizon,
                failures: 0,
            })
        })
        .collect();

    let period_series = PERIODS
        .iter()
        .map(|(name, key)| (name.to_string(), aggregate(runs, &dates, *key)))
        .collect();

    let snapshot = Snapshot {
        daily_series,
        period_series,
        station_records,
        bottlenecks: bottlenecks(runs, options),
    };
    info!(
        "builder: {} days, {} station rows, {} bottlenecks flagged",
        snapshot.daily_series.len(),
        snapshot.station_records.len(),
        snapshot.bottlenecks.iter().filter(|b| b.is_bottleneck).count()
    );
    snapshot
}

fn aggregate(
    runs: &[SimulationRun],
    dates: &[NaiveDate],
    key: fn(&NaiveDate) -> i64,
) -> Vec<PeriodRecord> {
    let mut groups: BTreeMap<i64, Vec<&SimulationRun>> = BTreeMap::new();
    for (run, date) in runs.iter().zip(dates) {
        groups.entry(key(date)).or_default().push(run);
    }

    groups
        .into_iter()
        .map(|(period, group)| PeriodRecord {
            period_label: Some(period.to_string()),
            total_produced: Some(group.iter().map(|r| r.produced).sum::<f64>().trunc()),
            avg_produced: group_mean(&group, |r| r.produced),
            avg_defect_rate: group_mean(&group, |r| r.defect_rate),
            avg_repair_time: group_mean(&group, |r| r.avg_repair_time),
            occupancy_supply_avg: group_mean(&group, |r| r.supply_occupancy),
        })
        .collect()
}

fn group_mean(group: &[&SimulationRun], value: impl Fn(&SimulationRun) -> f64) -> f64 {
    let values: Vec<f64> = group.iter().map(|r| value(r)).collect();
    mean(&values).unwrap_or(0.0)
}

/// Per-station mean occupancy and idle fraction, busiest station first.
fn bottlenecks(runs: &[SimulationRun], options: &BuildOptions) -> Vec<BottleneckRecord> {
    let runs: Vec<&SimulationRun> = runs.iter().collect();
    let mut records: Vec<BottleneckRecord> = (0..options.station_count)
        .map(|station| {
            let occupancy = group_mean(&runs, |r| {
                r.station_occupancy.get(station).copied().unwrap_or(0.0)
            });
            let idle = group_mean(&runs, |r| r.station_idle.get(station).copied().unwrap_or(0.0));
            BottleneckRecord {
                station_id: station as i64,
                avg_occupancy: occupancy,
                avg_idle: Some(idle / options.idle_horizon),
                is_bottleneck: occupancy > options.bottleneck_threshold,
            }
        })
        .collect();
    // stable: equal occupancy keeps station order
    records.sort_by(|a, b| b.avg_occupancy.total_cmp(&a.avg_occupancy));
    records
}

/// Write `snapshot` as pretty-printed JSON, gzip-compressed when `path` ends
/// in `.gz`. Missing parent directories are created.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = snapshot.to_json_pretty()?;
    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);
    if is_gzip {
        let file = std::fs::File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?;
    } else {
        std::fs::write(path, json)?;
    }
    info!("builder: wrote snapshot to {}", path.display());
    Ok(())
}
