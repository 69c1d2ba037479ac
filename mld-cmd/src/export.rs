//! Export of every chart payload as one JSON document.

use log::info;
use mld_chart::{Dashboard, JsonChartRenderer};
use mld_store::MetricsStore;
use std::path::Path;

/// Render all charts of `store` and write them to `output`, keyed by
/// container id.
pub fn run_export(store: MetricsStore, output: &str) -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new(store, JsonChartRenderer::new());
    let drawn = dashboard.render_all();
    let json = dashboard.into_renderer().to_json_pretty()?;

    let path = Path::new(output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    info!("Export complete: {} charts. Output: {}", drawn, output);
    Ok(())
}
