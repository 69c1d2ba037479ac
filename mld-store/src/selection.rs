//! UI-selected state: time granularity and station filter.
//!
//! Both values arrive from closed sets of UI options as strings. They are
//! parsed here; whether a parsed value is acceptable for the loaded snapshot
//! is decided by the store setters.

use mld_core::snapshot::DAILY;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Time bucketing of the production series.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum Granularity {
    #[default]
    Daily,
    /// A named key of the snapshot's period series ("weekly", "monthly", ...).
    Period(String),
}

impl Granularity {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == DAILY {
            Granularity::Daily
        } else {
            Granularity::Period(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Granularity::Daily => DAILY,
            Granularity::Period(name) => name,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Granularity> for String {
    fn from(g: Granularity) -> Self {
        g.as_str().to_string()
    }
}

/// Which stations the status series covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum StationFilter {
    #[default]
    All,
    Station(usize),
}

impl FromStr for StationFilter {
    type Err = anyhow::Error;

    /// Accepts `"all"` or a station index written exactly as it is displayed
    /// (`"3"`, not `"03"`, `"+3"` or `" 3 "`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "all" {
            return Ok(StationFilter::All);
        }
        match value.parse::<usize>() {
            Ok(id) if id.to_string() == value => Ok(StationFilter::Station(id)),
            _ => Err(anyhow::anyhow!("invalid station filter: {:?}", value)),
        }
    }
}

impl fmt::Display for StationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationFilter::All => f.write_str("all"),
            StationFilter::Station(id) => write!(f, "{}", id),
        }
    }
}

impl From<StationFilter> for String {
    fn from(filter: StationFilter) -> Self {
        filter.to_string()
    }
}

/// The single live selection, owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    pub granularity: Granularity,
    pub station_filter: StationFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_daily_all() {
        let selection = Selection::default();
        assert_eq!(selection.granularity, Granularity::Daily);
        assert_eq!(selection.station_filter, StationFilter::All);
    }

    #[test]
    fn granularity_round_trips_through_strings() {
        assert_eq!(Granularity::parse("daily"), Granularity::Daily);
        assert_eq!(
            Granularity::parse(" weekly "),
            Granularity::Period("weekly".to_string())
        );
        assert_eq!(Granularity::parse("monthly").to_string(), "monthly");
    }

    #[test]
    fn station_filter_parsing() {
        assert_eq!("all".parse::<StationFilter>().unwrap(), StationFilter::All);
        assert_eq!(
            "3".parse::<StationFilter>().unwrap(),
            StationFilter::Station(3)
        );
        assert!("-1".parse::<StationFilter>().is_err());
        assert!("north".parse::<StationFilter>().is_err());
        for loose in ["+3", "03", " 4 ", "4\n", "ALL", " all"] {
            assert!(loose.parse::<StationFilter>().is_err(), "{:?}", loose);
        }
        assert_eq!("0".parse::<StationFilter>().unwrap(), StationFilter::Station(0));
        assert_eq!(StationFilter::Station(4).to_string(), "4");
    }

    #[test]
    fn selection_serializes_as_ui_strings() {
        let selection = Selection {
            granularity: Granularity::Period("weekly".to_string()),
            station_filter: StationFilter::Station(2),
        };
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["granularity"], "weekly");
        assert_eq!(json["station_filter"], "2");
    }
}
