//! Dashboard controller.
//!
//! Ties a [`MetricsStore`] to a [`ChartRenderer`]: after the one load every
//! chart is drawn once, and each UI event updates the selection and redraws
//! only the charts that depend on it.

use crate::payload::{build_payload, ChartKind};
use crate::renderer::ChartRenderer;
use log::{debug, info, warn};
use mld_core::{LoadError, SnapshotSource};
use mld_store::{MetricsConfig, MetricsStore};

/// Input from the surrounding UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The granularity selector changed to the given value.
    GranularityChanged(String),
    /// The station selector changed to the given value.
    StationFilterChanged(String),
    /// The viewport changed size.
    Resize,
}

pub struct Dashboard<R: ChartRenderer> {
    store: MetricsStore,
    renderer: R,
}

impl<R: ChartRenderer> Dashboard<R> {
    /// Wrap an existing store. Nothing is drawn until [`Dashboard::init`].
    pub fn new(store: MetricsStore, renderer: R) -> Self {
        Self { store, renderer }
    }

    /// First draw after the snapshot is loaded.
    pub fn init(&mut self) -> usize {
        if !self.store.is_loaded() {
            warn!("dashboard: initialising without a snapshot");
        }
        self.render_all()
    }

    /// Load the snapshot from `source` and draw every chart.
    pub async fn open(
        source: &SnapshotSource,
        config: MetricsConfig,
        renderer: R,
    ) -> Result<Self, LoadError> {
        let mut store = MetricsStore::with_config(config);
        store.load(source).await?;
        let mut dashboard = Self::new(store, renderer);
        dashboard.init();
        Ok(dashboard)
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Draw every chart that has data. Returns how many were drawn.
    pub fn render_all(&mut self) -> usize {
        let drawn = ChartKind::ALL
            .iter()
            .filter(|kind| self.render(**kind))
            .count();
        info!("dashboard: drew {} of {} charts", drawn, ChartKind::ALL.len());
        drawn
    }

    /// Draw one chart. When its query is empty the container is cleared
    /// instead and `false` is returned.
    pub fn render(&mut self, chart: ChartKind) -> bool {
        match build_payload(chart, &self.store) {
            Some(payload) => {
                self.renderer.draw(&payload);
                true
            }
            None => {
                self.renderer.clear(chart);
                false
            }
        }
    }

    /// Apply `event` and redraw what depends on it. Returns the number of
    /// charts drawn; rejected selector values draw nothing.
    pub fn handle(&mut self, event: UiEvent) -> usize {
        debug!("dashboard: {:?}", event);
        match event {
            UiEvent::GranularityChanged(value) => {
                if self.store.set_time_granularity(&value) {
                    self.render_all()
                } else {
                    0
                }
            }
            UiEvent::StationFilterChanged(value) => {
                if self.store.set_station_filter(&value) {
                    usize::from(self.render(ChartKind::StationStatus))
                } else {
                    0
                }
            }
            UiEvent::Resize => self.render_all(),
        }
    }
}
