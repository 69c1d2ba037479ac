//! Core types for manufacturing line dashboard data.
//!
//! - `snapshot`: the precomputed JSON snapshot (daily series, period
//!   aggregates, per-station rows, bottleneck analysis)
//! - `source`: where a snapshot comes from (local file, gzip file, HTTP)
//! - `error`: `LoadError` for everything that can go wrong while loading

pub mod error;
pub mod snapshot;
pub mod source;

pub use error::LoadError;
pub use snapshot::{BottleneckRecord, DailyRecord, PeriodRecord, Snapshot, StationRecord};
pub use source::SnapshotSource;
