//! Derived manufacturing-line metrics over a dashboard snapshot.
//!
//! [`MetricsStore`] owns the loaded [`Snapshot`] and the UI [`Selection`]
//! (time granularity and station filter) and exposes pure queries that the
//! chart layer renders. It knows nothing about pixels or DOM elements.
//!
//! # Usage
//!
//! ```rust
//! use mld_store::MetricsStore;
//!
//! let mut store = MetricsStore::new();
//! assert!(store.summary().is_none());
//!
//! store
//!     .load_from_str(r#"{"company": [{"fecha": "2025-01-01", "produccion_final": 100,
//!                          "tasa_defectos": 0.05, "tiempo_reparacion_promedio": 10,
//!                          "retraso_promedio": 2}]}"#)
//!     .unwrap();
//!
//! let summary = store.summary().unwrap();
//! assert_eq!(summary.total_production, 100.0);
//! ```
//!
//! # Lifecycle
//!
//! A store starts empty with selection `("daily", "all")`. Every query on an
//! empty store returns an empty sequence (or `None` for [`MetricsStore::summary`]).
//! The snapshot is installed exactly once and never mutated afterwards; the
//! selection changes only through the validating setters.

pub mod config;
pub mod models;
mod queries;
pub mod selection;

pub use config::MetricsConfig;
pub use queries::{IDLE, OCCUPIED, OPERATIVE};
pub use selection::{Granularity, Selection, StationFilter};

use log::{info, warn};
use mld_core::{LoadError, Snapshot, SnapshotSource};

/// Owner of the snapshot and the selection state.
#[derive(Debug, Clone, Default)]
pub struct MetricsStore {
    snapshot: Option<Snapshot>,
    selection: Selection,
    config: MetricsConfig,
}

impl MetricsStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MetricsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The loaded snapshot, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Fetch the snapshot from `source` and make it the operative data.
    ///
    /// Fails without touching the source if a snapshot is already loaded.
    pub async fn load(&mut self, source: &SnapshotSource) -> Result<&Snapshot, LoadError> {
        if self.snapshot.is_some() {
            return Err(LoadError::AlreadyLoaded);
        }
        let snapshot = source.fetch().await?;
        self.install(snapshot)
    }

    /// Parse a JSON payload held in memory and install it.
    pub fn load_from_str(&mut self, json: &str) -> Result<&Snapshot, LoadError> {
        if self.snapshot.is_some() {
            return Err(LoadError::AlreadyLoaded);
        }
        let snapshot = Snapshot::from_json_str(json)?;
        self.install(snapshot)
    }

    /// Install an already-parsed snapshot.
    pub fn install(&mut self, snapshot: Snapshot) -> Result<&Snapshot, LoadError> {
        if self.snapshot.is_some() {
            return Err(LoadError::AlreadyLoaded);
        }
        info!(
            "store: installed snapshot with {} daily rows, periods {:?}",
            snapshot.daily_series.len(),
            snapshot.period_names()
        );
        let snapshot: &Snapshot = self.snapshot.insert(snapshot);
        Ok(snapshot)
    }

    /// Select `"daily"` or a period name present in the snapshot.
    ///
    /// Unknown names leave the current granularity in place. Returns whether
    /// the value was accepted.
    pub fn set_time_granularity(&mut self, value: &str) -> bool {
        let granularity = Granularity::parse(value);
        let known = match &granularity {
            Granularity::Daily => true,
            Granularity::Period(name) => self
                .snapshot
                .as_ref()
                .map(|s| s.has_period(name))
                .unwrap_or(false),
        };
        if !known {
            warn!(
                "store: ignoring unknown granularity {:?}, keeping {}",
                value, self.selection.granularity
            );
            return false;
        }
        self.selection.granularity = granularity;
        true
    }

    /// Select `"all"` or a station index in `0..station_count`.
    ///
    /// Invalid values leave the current filter in place. Returns whether the
    /// value was accepted.
    pub fn set_station_filter(&mut self, value: &str) -> bool {
        let filter = match value.parse::<StationFilter>() {
            Ok(StationFilter::Station(id)) if id >= self.config.station_count => None,
            Ok(filter) => Some(filter),
            Err(_) => None,
        };
        match filter {
            Some(filter) => {
                self.selection.station_filter = filter;
                true
            }
            None => {
                warn!(
                    "store: ignoring invalid station filter {:?}, keeping {}",
                    value, self.selection.station_filter
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "company": [{"fecha": "2025-01-01", "produccion_final": 100}],
        "time_periods": {"weekly": [{"periodo": 1, "produccion_total": 100}]}
    }"#;

    #[test]
    fn starts_empty_with_default_selection() {
        let store = MetricsStore::new();
        assert!(!store.is_loaded());
        assert_eq!(store.selection(), &Selection::default());
    }

    #[test]
    fn second_load_is_rejected() {
        let mut store = MetricsStore::new();
        store.load_from_str(PAYLOAD).unwrap();
        let err = store.load_from_str(PAYLOAD).unwrap_err();
        assert!(matches!(err, LoadError::AlreadyLoaded));
        assert!(store.is_loaded());
    }

    #[test]
    fn malformed_payload_leaves_store_empty() {
        let mut store = MetricsStore::new();
        let err = store.load_from_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
        assert!(!store.is_loaded());
        // A failed load does not count as the one load.
        assert!(store.load_from_str(PAYLOAD).is_ok());
    }

    #[test]
    fn granularity_setter_validates_against_snapshot() {
        let mut store = MetricsStore::new();
        // Before load only "daily" is known.
        assert!(!store.set_time_granularity("weekly"));
        store.load_from_str(PAYLOAD).unwrap();
        assert!(store.set_time_granularity("weekly"));
        assert_eq!(
            store.selection().granularity,
            Granularity::Period("weekly".to_string())
        );
        assert!(!store.set_time_granularity("fortnightly"));
        assert_eq!(store.selection().granularity.as_str(), "weekly");
        assert!(store.set_time_granularity("daily"));
        assert_eq!(store.selection().granularity, Granularity::Daily);
    }

    #[test]
    fn station_filter_setter_validates_range() {
        let mut store = MetricsStore::new();
        assert!(store.set_station_filter("5"));
        assert_eq!(store.selection().station_filter, StationFilter::Station(5));
        assert!(!store.set_station_filter("6"));
        assert!(!store.set_station_filter("station-2"));
        assert!(!store.set_station_filter("+3"));
        assert!(!store.set_station_filter("03"));
        assert!(!store.set_station_filter(" 4 "));
        assert_eq!(store.selection().station_filter, StationFilter::Station(5));
        assert!(store.set_station_filter("all"));
        assert_eq!(store.selection().station_filter, StationFilter::All);
    }

    #[test]
    fn station_filter_respects_configured_count() {
        let config = MetricsConfig {
            station_count: 8,
            ..MetricsConfig::default()
        };
        let mut store = MetricsStore::with_config(config);
        assert!(store.set_station_filter("7"));
    }

    #[tokio::test]
    async fn load_from_file_source() {
        let path = std::env::temp_dir().join(format!("mld-store-{}.json", std::process::id()));
        std::fs::write(&path, PAYLOAD).unwrap();
        let mut store = MetricsStore::new();
        let source = SnapshotSource::Path(path.clone());
        let snapshot = store.load(&source).await.unwrap();
        assert_eq!(snapshot.daily_series.len(), 1);
        assert!(matches!(
            store.load(&source).await.unwrap_err(),
            LoadError::AlreadyLoaded
        ));
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn failed_load_keeps_queries_neutral() {
        let mut store = MetricsStore::new();
        let source = SnapshotSource::Path("/nonexistent/mld/dashboard_data.json".into());
        assert!(store.load(&source).await.is_err());
        assert!(store.summary().is_none());
        assert!(store.production_series().is_empty());
    }
}
