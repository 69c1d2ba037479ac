//! The precomputed dashboard snapshot.
//!
//! Field names on the wire are the snake_case Spanish keys written by the
//! snapshot generator (`produccion_final`, `tasa_defectos`, `estacion_id`, ...);
//! serde renames map them onto the English model names used in Rust.
//!
//! Row-level fields that the derivation layer filters on (dates, production
//! values, station ids) are `Option`s so that one bad row never fails the
//! whole load. Numeric measurements default to zero when absent.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Name of the granularity that is served from the daily series rather than
/// from `period_series`.
pub const DAILY: &str = "daily";

/// One day of company-wide production figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar date, "YYYY-MM-DD".
    #[serde(rename = "fecha", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Finished units produced that day.
    #[serde(
        rename = "produccion_final",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_produced: Option<f64>,
    /// Fraction of products rejected as defective.
    #[serde(rename = "tasa_defectos", default)]
    pub defect_rate: f64,
    /// Mean repair time in minutes.
    #[serde(rename = "tiempo_reparacion_promedio", default)]
    pub avg_repair_time: f64,
    /// Mean delay caused by bottlenecks, in minutes.
    #[serde(rename = "retraso_promedio", default)]
    pub avg_delay: f64,
    /// Occupancy of the supply (restocking) device.
    #[serde(rename = "ocupacion_suministro", default)]
    pub supply_occupancy: f64,
}

/// One bucket of an aggregated period series (week, month, quarter, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Bucket label. The generator writes integers (week/month numbers);
    /// strings are accepted too.
    #[serde(
        rename = "periodo",
        default,
        deserialize_with = "deserialize_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub period_label: Option<String>,
    #[serde(
        rename = "produccion_total",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_produced: Option<f64>,
    #[serde(rename = "produccion_promedio", default)]
    pub avg_produced: f64,
    #[serde(rename = "tasa_defectos_promedio", default)]
    pub avg_defect_rate: f64,
    #[serde(rename = "tiempo_reparacion_promedio", default)]
    pub avg_repair_time: f64,
    #[serde(rename = "ocupacion_suministro_promedio", default)]
    pub occupancy_supply_avg: f64,
}

/// Occupancy and idle fractions of one station on one date.
///
/// The operative fraction is never stored; it is `1 - occupancy - idle`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(rename = "estacion_id", default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<i64>,
    #[serde(rename = "fecha", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "ocupacion", default)]
    pub occupancy_fraction: f64,
    #[serde(rename = "inactividad", default)]
    pub idle_fraction: f64,
    /// Failure count reported by the generator (currently always 0).
    #[serde(rename = "fallos", default)]
    pub failures: u32,
}

impl StationRecord {
    /// Station index if it lies in `0..station_count`.
    pub fn station_index(&self, station_count: usize) -> Option<usize> {
        self.station_id
            .and_then(|id| usize::try_from(id).ok())
            .filter(|id| *id < station_count)
    }
}

/// Bottleneck analysis for one station, passed through to the chart layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BottleneckRecord {
    #[serde(rename = "estacion_id", default)]
    pub station_id: i64,
    #[serde(rename = "ocupacion_promedio", default)]
    pub avg_occupancy: f64,
    #[serde(
        rename = "inactividad_promedio",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub avg_idle: Option<f64>,
    #[serde(rename = "posible_cuello_botella", default)]
    pub is_bottleneck: bool,
}

/// The whole dashboard payload. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "company")]
    pub daily_series: Vec<DailyRecord>,
    #[serde(rename = "time_periods", default)]
    pub period_series: BTreeMap<String, Vec<PeriodRecord>>,
    #[serde(rename = "workstation", default)]
    pub station_records: Vec<StationRecord>,
    #[serde(default)]
    pub bottlenecks: Vec<BottleneckRecord>,
}

impl Snapshot {
    /// Parse a snapshot from a JSON document.
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a snapshot from any reader yielding a JSON document.
    pub fn from_reader<R: Read>(reader: R) -> crate::error::Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serialize back to the wire format, pretty-printed.
    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of the aggregated period series, excluding `daily`.
    pub fn period_names(&self) -> Vec<&str> {
        self.period_series
            .keys()
            .map(String::as_str)
            .filter(|name| *name != DAILY)
            .collect()
    }

    /// Whether `name` selects a period series present in this snapshot.
    pub fn has_period(&self, name: &str) -> bool {
        name != DAILY && self.period_series.contains_key(name)
    }
}

fn deserialize_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
