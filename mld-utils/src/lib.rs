//! Shared utility functions for MLD crates.

/// Date utility functions
pub mod dates {
    use chrono::{Datelike, Duration, NaiveDate};

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Date of the `index`-th simulation run when runs are laid out one per day
    /// starting at `start`.
    pub fn run_date(start: &NaiveDate, index: usize) -> NaiveDate {
        *start + Duration::days(index as i64)
    }

    /// ISO-8601 week number (1-53).
    ///
    /// Only the week number is returned, not the ISO year, so the last days of
    /// December can land in week 1.
    pub fn iso_week(date: &NaiveDate) -> u32 {
        date.iso_week().week()
    }

    /// Calendar quarter (1-4).
    pub fn quarter(date: &NaiveDate) -> u32 {
        (date.month() - 1) / 3 + 1
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2025-03-09");
            assert_eq!(parse_date(&formatted).unwrap(), date);
            assert!(parse_date("09/03/2025").is_err());
        }

        #[test]
        fn test_run_date() {
            let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
            assert_eq!(run_date(&start, 0), start);
            assert_eq!(
                run_date(&start, 31),
                NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
            );
        }

        #[test]
        fn test_iso_week() {
            // 2025-01-01 is a Wednesday in ISO week 1
            let jan1 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
            assert_eq!(iso_week(&jan1), 1);
            let jan6 = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
            assert_eq!(iso_week(&jan6), 2);
            // 2025-12-29 belongs to week 1 of ISO year 2026
            let dec29 = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
            assert_eq!(iso_week(&dec29), 1);
        }

        #[test]
        fn test_quarter() {
            let q = |m| quarter(&NaiveDate::from_ymd_opt(2025, m, 15).unwrap());
            assert_eq!(q(1), 1);
            assert_eq!(q(3), 1);
            assert_eq!(q(4), 2);
            assert_eq!(q(9), 3);
            assert_eq!(q(12), 4);
        }
    }
}

/// Numeric helpers shared by the derivation layer and the snapshot builder
pub mod stats {
    /// Arithmetic mean, or `None` for an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Round to the nearest integer with ties going toward positive infinity
    /// (`Math.round` semantics, unlike `f64::round` which ties away from zero).
    pub fn round_half_up(value: f64) -> f64 {
        (value + 0.5).floor()
    }

    /// Clamp into `[0, 1]`. NaN maps to 0.
    pub fn clamp_unit(value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, 1.0)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_mean() {
            assert_eq!(mean(&[]), None);
            assert_eq!(mean(&[2.0]), Some(2.0));
            assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        }

        #[test]
        fn test_round_half_up() {
            assert_eq!(round_half_up(4.5), 5.0);
            assert_eq!(round_half_up(4.49), 4.0);
            assert_eq!(round_half_up(-2.5), -2.0);
            assert_eq!(round_half_up(5.0), 5.0);
        }

        #[test]
        fn test_clamp_unit() {
            assert_eq!(clamp_unit(-0.3), 0.0);
            assert_eq!(clamp_unit(0.42), 0.42);
            assert_eq!(clamp_unit(1.7), 1.0);
            assert_eq!(clamp_unit(f64::NAN), 0.0);
            assert_eq!(clamp_unit(f64::INFINITY), 1.0);
            assert_eq!(clamp_unit(f64::NEG_INFINITY), 0.0);
        }
    }
}
