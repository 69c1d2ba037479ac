//! Query result model structs.
//!
//! All structs derive `Serialize` so the chart layer can hand them to a
//! drawing library as JSON.

use serde::Serialize;

/// A single (label, value) pair of the production chart. The label is a date
/// under daily granularity and a period label otherwise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Headline figures of the summary cards.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    /// Sum of units produced over the selected series.
    pub total_production: f64,
    /// `round(total_production * mean(row defect rate)) / total_production`.
    ///
    /// This derives total defects from the *unweighted* mean of the per-row
    /// rates, so it differs from a volume-weighted rate whenever production
    /// varies between rows.
    pub defect_rate: f64,
    /// Mean of the per-row repair times (minutes).
    pub avg_repair_time: f64,
    /// Mean of the per-row delays. Period series carry no delay column, so
    /// their supply-device occupancy is averaged instead.
    pub avg_delay: f64,
}

/// Average time split of one station across every date it reported.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StationOccupancy {
    pub station_id: usize,
    pub occupancy: f64,
    pub idle: f64,
    /// `1 - occupancy - idle`; negative when the inputs are inconsistent.
    pub operative: f64,
}

/// One slice of the plant-wide occupation pie.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OccupationShare {
    pub label: String,
    pub fraction: f64,
}

/// Time split on one date, for one station or averaged over all of them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StationStatus {
    pub date: String,
    pub occupancy: f64,
    pub idle: f64,
    pub operative: f64,
}

/// Composite daily efficiency score in `[0, 1]`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EfficiencyPoint {
    pub date: String,
    pub efficiency: f64,
}
