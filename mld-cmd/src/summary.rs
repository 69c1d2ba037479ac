//! Plain-text report of the derived metrics.

use mld_chart::payload::group_thousands;
use mld_store::MetricsStore;
use std::fmt::Write;

pub fn run_summary(store: &MetricsStore) -> anyhow::Result<()> {
    print!("{}", format_summary(store)?);
    Ok(())
}

/// Summary cards, production series, per-station occupancy and the
/// bottleneck analysis under the store's current selection.
pub fn format_summary(store: &MetricsStore) -> anyhow::Result<String> {
    let selection = store.selection();
    let mut out = String::new();
    writeln!(
        out,
        "Granularity: {}  Station: {}",
        selection.granularity, selection.station_filter
    )?;

    match store.summary() {
        Some(summary) => {
            writeln!(out, "Total production:   {}", group_thousands(summary.total_production))?;
            writeln!(out, "Defect rate:        {:.2}%", summary.defect_rate * 100.0)?;
            writeln!(out, "Avg repair time:    {:.2} min", summary.avg_repair_time)?;
            writeln!(out, "Avg delay:          {:.2} min", summary.avg_delay)?;
        }
        None => writeln!(out, "No production data")?,
    }

    writeln!(out, "\nProduction")?;
    for point in store.production_series() {
        writeln!(out, "  {:<12} {:>12}", point.label, group_thousands(point.value))?;
    }

    writeln!(out, "\nStation occupancy")?;
    for station in store.station_occupancy_summary() {
        writeln!(
            out,
            "  station {}  occupied {:>6.1}%  idle {:>6.1}%  operative {:>6.1}%",
            station.station_id,
            station.occupancy * 100.0,
            station.idle * 100.0,
            station.operative * 100.0
        )?;
    }

    writeln!(out, "\nBottlenecks")?;
    for b in store.bottleneck_summary() {
        writeln!(
            out,
            "  station {}  occupancy {:>6.1}%{}",
            b.station_id,
            b.avg_occupancy * 100.0,
            if b.is_bottleneck { "  <- bottleneck" } else { "" }
        )?;
    }
    Ok(out)
}
