//! Chart layer seam for the MLD dashboard.
//!
//! This crate provides:
//! - `payload`: per-chart data + config JSON built from `MetricsStore` queries
//! - `stack`: stacked-bar layer computation (`y0`/`y1` per segment)
//! - `renderer`: the `ChartRenderer` trait and a JSON-collecting renderer
//! - `dashboard`: `Dashboard`, which turns UI events into store updates and
//!   re-render passes

pub mod dashboard;
pub mod payload;
pub mod renderer;
pub mod stack;

pub use dashboard::{Dashboard, UiEvent};
pub use payload::{build_payload, ChartKind, ChartPayload};
pub use renderer::{ChartRenderer, JsonChartRenderer};
