//! The drawing seam.
//!
//! Implementations wrap whatever actually draws (a D3 bridge, a native
//! plotting backend, a test double). `JsonChartRenderer` keeps the latest
//! payload of every chart so the whole dashboard can be exported as one
//! JSON document.

use crate::payload::{ChartKind, ChartPayload};
use serde_json::{json, Map, Value};

/// Something that can draw a chart payload into its container.
pub trait ChartRenderer {
    /// Draw or redraw the chart identified by `payload.chart`.
    fn draw(&mut self, payload: &ChartPayload);

    /// Empty the chart's container; called when its query has no data.
    fn clear(&mut self, chart: ChartKind);
}

/// Collects the most recent payload per container.
#[derive(Debug, Default, Clone)]
pub struct JsonChartRenderer {
    charts: Map<String, Value>,
    draws: usize,
}

impl JsonChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `draw` calls received so far.
    pub fn draw_count(&self) -> usize {
        self.draws
    }

    /// Latest `{data, config}` object drawn into `container_id`.
    pub fn chart(&self, container_id: &str) -> Option<&Value> {
        self.charts.get(container_id)
    }

    /// All charts keyed by container id.
    pub fn to_value(&self) -> Value {
        Value::Object(self.charts.clone())
    }

    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.charts)?)
    }
}

impl ChartRenderer for JsonChartRenderer {
    fn draw(&mut self, payload: &ChartPayload) {
        self.draws += 1;
        self.charts.insert(
            payload.container_id.clone(),
            json!({ "data": payload.data, "config": payload.config }),
        );
    }

    fn clear(&mut self, chart: ChartKind) {
        self.charts.remove(chart.container_id());
    }
}
