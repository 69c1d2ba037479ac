//! Chart payloads.
//!
//! A payload is what a drawing library needs to (re)draw one chart: the
//! container it lives in, the data rows and a small config object (title,
//! axis labels, colors, reference lines). Both halves are plain JSON so any
//! renderer can consume them.

use crate::stack::{stack_layers, StackKey};
use mld_store::models::{StationOccupancy, StationStatus, Summary};
use mld_store::{Granularity, MetricsStore, StationFilter, IDLE, OCCUPIED, OPERATIVE};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// Colors of the occupied / idle / operative components.
pub const STATUS_COLORS: [&str; 3] = ["#ff7f0e", "#d62728", "#2ca02c"];
/// One color per station.
pub const STATION_COLORS: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];
pub const PRIMARY_COLOR: &str = "#1f77b4";
pub const BOTTLENECK_COLOR: &str = "red";

/// The dashboard's charts, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ChartKind {
    SummaryCards,
    Production,
    OccupationPie,
    StationOccupancy,
    Bottleneck,
    StationStatus,
    PlantEfficiency,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::SummaryCards,
        ChartKind::Production,
        ChartKind::OccupationPie,
        ChartKind::StationOccupancy,
        ChartKind::Bottleneck,
        ChartKind::StationStatus,
        ChartKind::PlantEfficiency,
    ];

    /// DOM id of the element the chart is drawn into.
    pub fn container_id(&self) -> &'static str {
        match self {
            ChartKind::SummaryCards => "summary-cards",
            ChartKind::Production => "production-chart",
            ChartKind::OccupationPie => "occupation-pie-chart",
            ChartKind::StationOccupancy => "station-occupation-chart",
            ChartKind::Bottleneck => "bottleneck-chart",
            ChartKind::StationStatus => "station-status-chart",
            ChartKind::PlantEfficiency => "plant-efficiency-chart",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.container_id())
    }
}

/// Data and config for one chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPayload {
    pub chart: ChartKind,
    pub container_id: String,
    pub data: Value,
    pub config: Value,
}

impl ChartPayload {
    fn new(chart: ChartKind, data: Value, config: Value) -> Self {
        Self {
            chart,
            container_id: chart.container_id().to_string(),
            data,
            config,
        }
    }

    pub fn data_json(&self) -> String {
        self.data.to_string()
    }

    pub fn config_json(&self) -> String {
        self.config.to_string()
    }
}

/// Build the payload for `chart` from the store's current state.
///
/// `None` when the underlying query is empty; the caller skips drawing.
pub fn build_payload(chart: ChartKind, store: &MetricsStore) -> Option<ChartPayload> {
    let payload = match chart {
        ChartKind::SummaryCards => summary_cards(store),
        ChartKind::Production => production(store),
        ChartKind::OccupationPie => occupation_pie(store),
        ChartKind::StationOccupancy => station_occupancy(store),
        ChartKind::Bottleneck => bottleneck(store),
        ChartKind::StationStatus => station_status(store),
        ChartKind::PlantEfficiency => plant_efficiency(store),
    };
    if payload.is_none() {
        log::debug!("payload: {} has no data, skipping", chart);
    }
    payload
}

fn summary_cards(store: &MetricsStore) -> Option<ChartPayload> {
    let summary = store.summary()?;
    let display = summary_display(&summary);
    Some(ChartPayload::new(
        ChartKind::SummaryCards,
        json!({ "summary": summary, "display": display }),
        json!({ "granularity": store.selection().granularity }),
    ))
}

/// Card texts: grouped total, percentage with two decimals, minutes.
fn summary_display(summary: &Summary) -> Value {
    json!({
        "total_production": group_thousands(summary.total_production),
        "defect_rate": format!("{:.2}%", summary.defect_rate * 100.0),
        "avg_repair_time": format!("{:.2} min", summary.avg_repair_time),
        "avg_delay": format!("{:.2} min", summary.avg_delay),
    })
}

/// Format a count with `,` thousand separators, e.g. `1234567` -> `1,234,567`.
/// Fractions are rounded to the nearest unit.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn production(store: &MetricsStore) -> Option<ChartPayload> {
    let series = store.production_series();
    if series.is_empty() {
        return None;
    }
    let granularity = &store.selection().granularity;
    let mark = match granularity {
        Granularity::Daily => "line",
        Granularity::Period(_) => "bar",
    };
    Some(ChartPayload::new(
        ChartKind::Production,
        json!(series),
        json!({
            "title": "Production",
            "mark": mark,
            "granularity": granularity,
            "yAxisLabel": "Units produced",
            "color": PRIMARY_COLOR,
        }),
    ))
}

fn occupation_pie(store: &MetricsStore) -> Option<ChartPayload> {
    let distribution = store.occupation_distribution();
    if distribution.is_empty() {
        return None;
    }
    Some(ChartPayload::new(
        ChartKind::OccupationPie,
        json!(distribution),
        json!({
            "title": "Plant occupation",
            "keys": [OCCUPIED, IDLE, OPERATIVE],
            "colors": STATUS_COLORS,
        }),
    ))
}

fn station_occupancy(store: &MetricsStore) -> Option<ChartPayload> {
    let stations = store.station_occupancy_summary();
    if stations.is_empty() {
        return None;
    }
    let keys: [StackKey<'_, StationOccupancy>; 3] = [
        (OCCUPIED, &|s: &StationOccupancy| s.occupancy),
        (IDLE, &|s: &StationOccupancy| s.idle),
        (OPERATIVE, &|s: &StationOccupancy| s.operative),
    ];
    let layers = stack_layers(&stations, &keys, |s| s.station_id.to_string());
    Some(ChartPayload::new(
        ChartKind::StationOccupancy,
        json!({ "rows": stations, "layers": layers }),
        json!({
            "title": "Station occupation",
            "xAxisLabel": "Station",
            "yDomain": [0.0, 1.0],
            "colors": STATUS_COLORS,
        }),
    ))
}

fn bottleneck(store: &MetricsStore) -> Option<ChartPayload> {
    let bottlenecks = store.bottleneck_summary();
    if bottlenecks.is_empty() {
        return None;
    }
    Some(ChartPayload::new(
        ChartKind::Bottleneck,
        json!(bottlenecks),
        json!({
            "title": "Bottleneck analysis",
            "threshold": store.config().bottleneck_threshold,
            "yDomain": [0.0, 1.0],
            "color": PRIMARY_COLOR,
            "bottleneckColor": BOTTLENECK_COLOR,
        }),
    ))
}

fn station_status(store: &MetricsStore) -> Option<ChartPayload> {
    let series = store.station_status_time_series();
    if series.is_empty() {
        return None;
    }
    let keys: [StackKey<'_, StationStatus>; 3] = [
        (OCCUPIED, &|s: &StationStatus| s.occupancy),
        (IDLE, &|s: &StationStatus| s.idle),
        (OPERATIVE, &|s: &StationStatus| s.operative),
    ];
    let layers = stack_layers(&series, &keys, |s| s.date.clone());
    let filter = store.selection().station_filter;
    let color = match filter {
        StationFilter::All => None,
        StationFilter::Station(id) => STATION_COLORS.get(id).copied(),
    };
    Some(ChartPayload::new(
        ChartKind::StationStatus,
        json!({ "rows": series, "layers": layers }),
        json!({
            "title": "Station status",
            "stationFilter": filter,
            "stationColor": color,
            "yDomain": [0.0, 1.0],
            "colors": STATUS_COLORS,
        }),
    ))
}

fn plant_efficiency(store: &MetricsStore) -> Option<ChartPayload> {
    let series = store.plant_efficiency_series();
    if series.is_empty() {
        return None;
    }
    Some(ChartPayload::new(
        ChartKind::PlantEfficiency,
        json!(series),
        json!({
            "title": "Plant efficiency",
            "referenceLine": store.config().efficiency_reference,
            "yDomain": [0.0, 1.0],
            "color": PRIMARY_COLOR,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mld_store::MetricsConfig;

    const PAYLOAD: &str = r#"{
        "company": [
            {"fecha": "2025-01-01", "produccion_final": 1200, "tasa_defectos": 0.05,
             "tiempo_reparacion_promedio": 3.0, "retraso_promedio": 1.5},
            {"fecha": "2025-01-02", "produccion_final": 1300, "tasa_defectos": 0.03,
             "tiempo_reparacion_promedio": 2.0, "retraso_promedio": 2.5}
        ],
        "time_periods": {"weekly": [{"periodo": 1, "produccion_total": 2500}]},
        "workstation": [
            {"fecha": "2025-01-01", "estacion_id": 0, "ocupacion": 0.8, "inactividad": 0.1},
            {"fecha": "2025-01-01", "estacion_id": 1, "ocupacion": 0.4, "inactividad": 0.3}
        ],
        "bottlenecks": [
            {"estacion_id": 0, "ocupacion_promedio": 0.8, "posible_cuello_botella": true}
        ]
    }"#;

    fn store() -> MetricsStore {
        let mut store = MetricsStore::new();
        store.load_from_str(PAYLOAD).unwrap();
        store
    }

    #[test]
    fn every_chart_has_a_payload_for_full_snapshot() {
        let store = store();
        for chart in ChartKind::ALL {
            let payload = build_payload(chart, &store).unwrap();
            assert_eq!(payload.container_id, chart.container_id());
        }
    }

    #[test]
    fn empty_store_yields_no_payloads() {
        let store = MetricsStore::new();
        for chart in ChartKind::ALL {
            assert!(build_payload(chart, &store).is_none(), "{}", chart);
        }
    }

    #[test]
    fn summary_cards_are_formatted() {
        let payload = build_payload(ChartKind::SummaryCards, &store()).unwrap();
        let display = &payload.data["display"];
        assert_eq!(display["total_production"], "2,500");
        // round(2500 * 0.04) / 2500 = 0.04
        assert_eq!(display["defect_rate"], "4.00%");
        assert_eq!(display["avg_repair_time"], "2.50 min");
        assert_eq!(display["avg_delay"], "2.00 min");
    }

    #[test]
    fn production_mark_follows_granularity() {
        let mut store = store();
        let daily = build_payload(ChartKind::Production, &store).unwrap();
        assert_eq!(daily.config["mark"], "line");
        assert_eq!(daily.data.as_array().unwrap().len(), 2);

        store.set_time_granularity("weekly");
        let weekly = build_payload(ChartKind::Production, &store).unwrap();
        assert_eq!(weekly.config["mark"], "bar");
        assert_eq!(weekly.config["granularity"], "weekly");
        assert_eq!(weekly.data[0]["label"], "1");
    }

    #[test]
    fn bottleneck_threshold_comes_from_config() {
        let config = MetricsConfig {
            bottleneck_threshold: 0.85,
            ..MetricsConfig::default()
        };
        let mut store = MetricsStore::with_config(config);
        store.load_from_str(PAYLOAD).unwrap();
        let payload = build_payload(ChartKind::Bottleneck, &store).unwrap();
        assert_eq!(payload.config["threshold"], 0.85);
        assert_eq!(payload.data[0]["posible_cuello_botella"], true);
    }

    #[test]
    fn station_status_layers_are_stacked() {
        let payload = build_payload(ChartKind::StationStatus, &store()).unwrap();
        let layers = payload.data["layers"].as_array().unwrap();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0]["key"], OCCUPIED);
        let occupied_top = layers[0]["segments"][0]["y1"].as_f64().unwrap();
        let idle_bottom = layers[1]["segments"][0]["y0"].as_f64().unwrap();
        assert_eq!(occupied_top, idle_bottom);
        // Two of six stations reported; the other four count as zero.
        let top = layers[2]["segments"][0]["y1"].as_f64().unwrap();
        assert!((top - 2.0 / 6.0).abs() < 1e-9);
        assert_eq!(payload.config["stationFilter"], "all");
    }

    #[test]
    fn station_filter_selects_station_color() {
        let mut store = store();
        store.set_station_filter("1");
        let payload = build_payload(ChartKind::StationStatus, &store).unwrap();
        assert_eq!(payload.config["stationColor"], STATION_COLORS[1]);
        assert!((payload.data["rows"][0]["occupancy"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn group_thousands_formats() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(1234567.4), "1,234,567");
        assert_eq!(group_thousands(-45210.0), "-45,210");
    }
}
