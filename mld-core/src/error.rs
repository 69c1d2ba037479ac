/// Error types for loading dashboard snapshots
use thiserror::Error;

/// Text shown to the user when the dashboard cannot initialize.
pub const LOAD_FAILURE_MESSAGE: &str = "Dashboard data could not be loaded";

/// Failure while fetching or parsing a snapshot. Fatal to the dashboard.
#[derive(Error, Debug)]
pub enum LoadError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Transport unavailable or failed outside of HTTP
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Failed to read the snapshot from disk
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// Payload is not a well-formed snapshot document
    #[error("Malformed snapshot payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A snapshot is already installed; snapshots are immutable once loaded
    #[error("Snapshot already loaded")]
    AlreadyLoaded,
}

impl LoadError {
    /// Message suitable for the end user, independent of the cause.
    pub fn user_message(&self) -> &'static str {
        LOAD_FAILURE_MESSAGE
    }
}

/// Type alias for Results using LoadError
pub type Result<T> = std::result::Result<T, LoadError>;
