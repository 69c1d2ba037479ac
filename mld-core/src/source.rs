//! Snapshot sources.
//!
//! The dashboard reads its data once at startup, either from a local file
//! (optionally gzip-compressed) or from an HTTP endpoint. HTTP support needs
//! the `api` feature so that WASM and offline builds stay free of `reqwest`.

use crate::error::{LoadError, Result};
use crate::snapshot::Snapshot;
use flate2::read::GzDecoder;
use log::info;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Default location of the snapshot relative to the dashboard root.
pub const DEFAULT_SNAPSHOT_PATH: &str = "dashboard/data/dashboard_data.json";

/// Where a snapshot is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Local JSON file; a `.gz` extension means gzip-compressed JSON.
    Path(PathBuf),
    /// HTTP(S) URL answering a GET with the JSON document.
    Url(String),
}

impl SnapshotSource {
    /// Interpret a CLI-style location: `http://` and `https://` prefixes are
    /// URLs, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            SnapshotSource::Url(location.to_string())
        } else {
            SnapshotSource::Path(PathBuf::from(location))
        }
    }

    /// Fetch and parse the snapshot.
    pub async fn fetch(&self) -> Result<Snapshot> {
        let snapshot = match self {
            SnapshotSource::Path(path) => {
                let file = BufReader::new(File::open(path)?);
                let is_gzip = path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("gz"))
                    .unwrap_or(false);
                if is_gzip {
                    Snapshot::from_reader(GzDecoder::new(file))?
                } else {
                    Snapshot::from_reader(file)?
                }
            }
            SnapshotSource::Url(url) => fetch_url(url).await?,
        };
        info!(
            "Loaded snapshot from {}: {} daily rows, {} station rows, {} period series",
            self,
            snapshot.daily_series.len(),
            snapshot.station_records.len(),
            snapshot.period_series.len()
        );
        Ok(snapshot)
    }
}

impl Default for SnapshotSource {
    fn default() -> Self {
        SnapshotSource::Path(PathBuf::from(DEFAULT_SNAPSHOT_PATH))
    }
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSource::Path(path) => write!(f, "{}", path.display()),
            SnapshotSource::Url(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(feature = "api")]
async fn fetch_url(url: &str) -> Result<Snapshot> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(LoadError::Status(response.status().as_u16()));
    }
    let body = response.text().await?;
    Snapshot::from_json_str(&body)
}

#[cfg(not(feature = "api"))]
async fn fetch_url(url: &str) -> Result<Snapshot> {
    Err(LoadError::Transport(format!(
        "cannot fetch {}: built without the `api` feature",
        url
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const PAYLOAD: &str = r#"{"company": [{"fecha": "2025-01-01", "produccion_final": 10}]}"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mld-core-{}-{}", std::process::id(), name))
    }

    #[test]
    fn parse_distinguishes_urls_from_paths() {
        assert_eq!(
            SnapshotSource::parse("https://example.org/data.json"),
            SnapshotSource::Url("https://example.org/data.json".to_string())
        );
        assert_eq!(
            SnapshotSource::parse("../data/dashboard_data.json"),
            SnapshotSource::Path(PathBuf::from("../data/dashboard_data.json"))
        );
    }

    #[tokio::test]
    async fn fetches_plain_json_file() {
        let path = temp_path("plain.json");
        std::fs::write(&path, PAYLOAD).unwrap();
        let snapshot = SnapshotSource::Path(path.clone()).fetch().await.unwrap();
        assert_eq!(snapshot.daily_series.len(), 1);
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn fetches_gzip_json_file() {
        let path = temp_path("packed.json.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(PAYLOAD.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();
        let snapshot = SnapshotSource::Path(path.clone()).fetch().await.unwrap();
        assert_eq!(snapshot.daily_series[0].total_produced, Some(10.0));
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let err = SnapshotSource::Path(temp_path("absent.json"))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        assert_eq!(err.user_message(), "Dashboard data could not be loaded");
    }

    #[tokio::test]
    async fn malformed_file_is_a_load_error() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{\"company\": [").unwrap();
        let err = SnapshotSource::Path(path.clone()).fetch().await.unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
        std::fs::remove_file(path).unwrap();
    }
}
