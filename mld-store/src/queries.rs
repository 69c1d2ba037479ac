//! Derived-metric queries.
//!
//! Every query is a pure function of (snapshot, selection, config): calling it
//! twice without a setter in between yields identical output, ordering
//! included. On an empty store each query returns an empty `Vec`, and
//! [`MetricsStore::summary`] returns `None`.

use crate::models::{
    EfficiencyPoint, OccupationShare, SeriesPoint, StationOccupancy, StationStatus, Summary,
};
use crate::selection::{Granularity, StationFilter};
use crate::MetricsStore;
use mld_core::BottleneckRecord;
use mld_utils::stats::{clamp_unit, mean, round_half_up};
use std::collections::HashMap;

/// Labels of the plant-wide occupation distribution, in output order.
pub const OCCUPIED: &str = "Occupied";
pub const IDLE: &str = "Idle";
pub const OPERATIVE: &str = "Operative";

/// Production row of either granularity, reduced to what the summary needs.
struct SelectedRow<'a> {
    label: Option<&'a str>,
    produced: Option<f64>,
    defect_rate: f64,
    repair_time: f64,
    delay: f64,
}

impl MetricsStore {
    /// Rows of the series chosen by the current granularity, in source order.
    fn selected_rows(&self) -> Vec<SelectedRow<'_>> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Vec::new();
        };
        match &self.selection.granularity {
            Granularity::Daily => snapshot
                .daily_series
                .iter()
                .map(|d| SelectedRow {
                    label: d.date.as_deref(),
                    produced: d.total_produced,
                    defect_rate: d.defect_rate,
                    repair_time: d.avg_repair_time,
                    delay: d.avg_delay,
                })
                .collect(),
            Granularity::Period(name) => snapshot
                .period_series
                .get(name)
                .map(|rows| {
                    rows.iter()
                        .map(|p| SelectedRow {
                            label: p.period_label.as_deref(),
                            produced: p.total_produced,
                            defect_rate: p.avg_defect_rate,
                            repair_time: p.avg_repair_time,
                            delay: p.occupancy_supply_avg,
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Production per day, or per period bucket, in source order.
    ///
    /// Rows without a label or a production value are skipped.
    pub fn production_series(&self) -> Vec<SeriesPoint> {
        let points: Vec<SeriesPoint> = self
            .selected_rows()
            .into_iter()
            .filter_map(|row| match (row.label, row.produced) {
                (Some(label), Some(value)) => Some(SeriesPoint {
                    label: label.to_string(),
                    value,
                }),
                _ => None,
            })
            .collect();
        log::debug!("query: production_series returned {} points", points.len());
        points
    }

    /// Summary card figures over the selected series.
    ///
    /// Aggregates the rows that carry a production value. `None` when nothing
    /// is loaded or no such row exists. A total production of zero yields a
    /// defect rate of zero.
    pub fn summary(&self) -> Option<Summary> {
        let rows: Vec<SelectedRow<'_>> = self
            .selected_rows()
            .into_iter()
            .filter(|row| row.produced.is_some())
            .collect();
        if rows.is_empty() {
            return None;
        }

        let total_production: f64 = rows.iter().filter_map(|r| r.produced).sum();
        let rates: Vec<f64> = rows.iter().map(|r| r.defect_rate).collect();
        let repair_times: Vec<f64> = rows.iter().map(|r| r.repair_time).collect();
        let delays: Vec<f64> = rows.iter().map(|r| r.delay).collect();

        let avg_defect_rate = mean(&rates)?;
        let total_defects = round_half_up(total_production * avg_defect_rate);
        let defect_rate = if total_production != 0.0 {
            total_defects / total_production
        } else {
            0.0
        };

        Some(Summary {
            total_production,
            defect_rate,
            avg_repair_time: mean(&repair_times)?,
            avg_delay: mean(&delays)?,
        })
    }

    /// Mean occupancy and idle fraction per station, one entry for each
    /// station in `0..station_count`, ascending.
    ///
    /// Stations without rows report zero occupancy and idle time, hence an
    /// operative fraction of 1.
    pub fn station_occupancy_summary(&self) -> Vec<StationOccupancy> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Vec::new();
        };
        let station_count = self.config.station_count;

        // (occupancy sum, idle sum, row count) per station
        let mut totals = vec![(0.0_f64, 0.0_f64, 0_usize); station_count];
        for record in &snapshot.station_records {
            if record.date.is_none() {
                continue;
            }
            if let Some(id) = record.station_index(station_count) {
                let entry = &mut totals[id];
                entry.0 += record.occupancy_fraction;
                entry.1 += record.idle_fraction;
                entry.2 += 1;
            }
        }

        totals
            .into_iter()
            .enumerate()
            .map(|(station_id, (occupancy_sum, idle_sum, count))| {
                let (occupancy, idle) = if count > 0 {
                    (occupancy_sum / count as f64, idle_sum / count as f64)
                } else {
                    (0.0, 0.0)
                };
                StationOccupancy {
                    station_id,
                    occupancy,
                    idle,
                    operative: 1.0 - occupancy - idle,
                }
            })
            .collect()
    }

    /// Plant-wide split between occupied, idle and operative time.
    ///
    /// Sums each component over [`station_occupancy_summary`](Self::station_occupancy_summary)
    /// and normalizes by the grand total. Empty when the grand total is zero.
    pub fn occupation_distribution(&self) -> Vec<OccupationShare> {
        let stations = self.station_occupancy_summary();
        let (occupied, idle, operative) =
            stations.iter().fold((0.0, 0.0, 0.0), |acc, s| {
                (acc.0 + s.occupancy, acc.1 + s.idle, acc.2 + s.operative)
            });
        let total = occupied + idle + operative;
        if total == 0.0 {
            return Vec::new();
        }

        [(OCCUPIED, occupied), (IDLE, idle), (OPERATIVE, operative)]
            .into_iter()
            .map(|(label, sum)| OccupationShare {
                label: label.to_string(),
                fraction: sum / total,
            })
            .collect()
    }

    /// Bottleneck analysis exactly as stored in the snapshot.
    pub fn bottleneck_summary(&self) -> Vec<BottleneckRecord> {
        self.snapshot
            .as_ref()
            .map(|s| s.bottlenecks.clone())
            .unwrap_or_default()
    }

    /// Occupied/idle/operative split per date for the stacked status chart.
    ///
    /// Dates keep their first-seen order in the station rows. With the `all`
    /// filter each component is averaged over every station, a station with
    /// no row on that date contributing zero. With a single station the
    /// values are that station's own, all zero when it has no row that day.
    /// Only the last `status_window` dates are returned.
    pub fn station_status_time_series(&self) -> Vec<StationStatus> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Vec::new();
        };
        let station_count = self.config.station_count;
        if station_count == 0 {
            return Vec::new();
        }

        // date -> per-station (occupancy, idle), in first-seen date order
        let mut dates: Vec<(&str, Vec<Option<(f64, f64)>>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for record in &snapshot.station_records {
            let (Some(date), Some(id)) = (
                record.date.as_deref(),
                record.station_index(station_count),
            ) else {
                continue;
            };
            let slot = *index.entry(date).or_insert_with(|| {
                dates.push((date, vec![None; station_count]));
                dates.len() - 1
            });
            dates[slot].1[id] = Some((record.occupancy_fraction, record.idle_fraction));
        }

        let filter = self.selection.station_filter;
        let series: Vec<StationStatus> = dates
            .into_iter()
            .map(|(date, stations)| {
                let (occupancy, idle, operative) = match filter {
                    StationFilter::All => {
                        let (o, i, op) = stations.iter().flatten().fold(
                            (0.0, 0.0, 0.0),
                            |acc, (o, i)| (acc.0 + o, acc.1 + i, acc.2 + (1.0 - o - i)),
                        );
                        let n = station_count as f64;
                        (o / n, i / n, op / n)
                    }
                    StationFilter::Station(id) => match stations.get(id).copied().flatten() {
                        Some((o, i)) => (o, i, 1.0 - o - i),
                        None => (0.0, 0.0, 0.0),
                    },
                };
                StationStatus {
                    date: date.to_string(),
                    occupancy,
                    idle,
                    operative,
                }
            })
            .collect();

        let series = tail(series, self.config.status_window);
        log::debug!(
            "query: station_status_time_series returned {} dates",
            series.len()
        );
        series
    }

    /// Daily efficiency score `clamp(1 - defect_rate - avg_delay / divisor, 0, 1)`
    /// for the last `efficiency_window` dated days.
    pub fn plant_efficiency_series(&self) -> Vec<EfficiencyPoint> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Vec::new();
        };
        let divisor = self.config.efficiency_delay_divisor;
        let series: Vec<EfficiencyPoint> = snapshot
            .daily_series
            .iter()
            .filter_map(|d| {
                let date = d.date.as_deref()?;
                Some(EfficiencyPoint {
                    date: date.to_string(),
                    efficiency: clamp_unit(1.0 - d.defect_rate - d.avg_delay / divisor),
                })
            })
            .collect();
        tail(series, self.config.efficiency_window)
    }
}

/// Keep the last `n` items, preserving their order.
fn tail<T>(mut items: Vec<T>, n: usize) -> Vec<T> {
    if items.len() > n {
        items.drain(..items.len() - n);
    }
    items
}
