//! Period and date helpers shared by the data adapters and exporters.

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

use crate::utils::error::{EoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    Year,
    Month,
    Week,
    Day,
}

fn period_patterns() -> &'static [(PeriodType, Regex)] {
    static PATTERNS: OnceLock<Vec<(PeriodType, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (PeriodType::Year, Regex::new(r"^\d{4}$").unwrap()),
            (PeriodType::Month, Regex::new(r"^\d{6}$").unwrap()),
            (PeriodType::Month, Regex::new(r"^\d{4}-\d{2}$").unwrap()),
            (PeriodType::Week, Regex::new(r"^\d{4}-W\d{2}$").unwrap()),
            (PeriodType::Day, Regex::new(r"^\d{8}$").unwrap()),
            (PeriodType::Day, Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap()),
        ]
    })
}

/// Detect the period type of a DHIS2-style or ISO period string.
pub fn detect_period_type(s: &str) -> Option<PeriodType> {
    let s = s.trim();
    period_patterns()
        .iter()
        .find(|(_, re)| re.is_match(s))
        .map(|(kind, _)| *kind)
}

/// Compose a DHIS2 period code from date parts.
///
/// Precedence follows DHIS2 conventions: daily when year/month/day are all
/// given, weekly when year/week are given, then monthly, then yearly.
pub fn dhis2_period(
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    week: Option<u32>,
) -> Result<String> {
    match (year, month, day, week) {
        (Some(y), Some(m), Some(d), _) => Ok(format!("{:04}{:02}{:02}", y, m, d)),
        (Some(y), _, _, Some(w)) => Ok(format!("{:04}W{:02}", y, w)),
        (Some(y), Some(m), None, None) => Ok(format!("{:04}{:02}", y, m)),
        (Some(y), None, None, None) => Ok(format!("{:04}", y)),
        _ => Err(EoError::processing(
            "Not enough information to form a DHIS2 period code",
        )),
    }
}

/// Inclusive iterator over (year, month) pairs between two months.
pub fn iter_months(
    start_year: i32,
    start_month: u32,
    end_year: i32,
    end_month: u32,
) -> impl Iterator<Item = (i32, u32)> {
    (start_year..=end_year)
        .flat_map(|year| (1..=12u32).map(move |month| (year, month)))
        .filter(move |&(year, month)| {
            (year, month) >= (start_year, start_month) && (year, month) <= (end_year, end_month)
        })
}

/// Inclusive iterator over days between two dates.
pub fn iter_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let count = if end < start {
        0
    } else {
        (end - start).num_days() + 1
    };
    (0..count).map(move |offset| start + Duration::days(offset))
}

/// Number of days in a month, leap-year aware.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(year, month, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Parse a date-like string (`YYYY-MM-DD`, `YYYY-MM`, or `YYYY`) to a date,
/// defaulting missing parts to the start of the period.
pub fn ensure_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Some((year, month)) = parse_year_month_opt(s) {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, 1) {
            return Ok(d);
        }
    }
    Err(EoError::InvalidPeriodError {
        value: s.to_string(),
    })
}

fn parse_year_month_opt(s: &str) -> Option<(i32, u32)> {
    let mut parts = s.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    if (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}

/// Parse the year and month parts of a date-like string, ignoring any day part.
/// Adapters with monthly granularity accept `YYYY-MM` or full dates.
pub fn parse_year_month(s: &str) -> Result<(i32, u32)> {
    parse_year_month_opt(s.trim()).ok_or_else(|| EoError::InvalidPeriodError {
        value: s.to_string(),
    })
}

/// ISO week period string (`YYYY-Wnn`) for a date.
pub fn iso_week_period(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{:04}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_period_formats() {
        assert_eq!(detect_period_type("2024"), Some(PeriodType::Year));
        assert_eq!(detect_period_type("202401"), Some(PeriodType::Month));
        assert_eq!(detect_period_type("2024-01"), Some(PeriodType::Month));
        assert_eq!(detect_period_type("2024-W05"), Some(PeriodType::Week));
        assert_eq!(detect_period_type("20240115"), Some(PeriodType::Day));
        assert_eq!(detect_period_type("2024-01-15"), Some(PeriodType::Day));
        assert_eq!(detect_period_type("January 2024"), None);
    }

    #[test]
    fn composes_dhis2_period_codes() {
        assert_eq!(
            dhis2_period(Some(1998), Some(1), Some(5), None).unwrap(),
            "19980105"
        );
        assert_eq!(dhis2_period(Some(1998), None, None, Some(3)).unwrap(), "1998W03");
        assert_eq!(dhis2_period(Some(1998), Some(1), None, None).unwrap(), "199801");
        assert_eq!(dhis2_period(Some(1998), None, None, None).unwrap(), "1998");
        assert!(dhis2_period(None, Some(1), None, None).is_err());
    }

    #[test]
    fn iterates_months_across_year_boundary() {
        let months: Vec<_> = iter_months(2023, 11, 2024, 2).collect();
        assert_eq!(months, vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]);
    }

    #[test]
    fn iterates_days_inclusively() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let days: Vec<_> = iter_days(start, end).collect();
        assert_eq!(days.len(), 4); // 2024 is a leap year
        assert_eq!(days[2], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn empty_day_range_when_end_before_start() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(iter_days(start, end).count(), 0);
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2023, 12), 31);
        assert_eq!(days_in_month(2023, 4), 30);
    }

    #[test]
    fn ensure_date_accepts_partial_dates() {
        assert_eq!(
            ensure_date("2024-05-17").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
        );
        assert_eq!(
            ensure_date("2024-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(
            ensure_date("2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert!(ensure_date("2024-13").is_err());
        assert!(ensure_date("next tuesday").is_err());
    }

    #[test]
    fn year_month_parsing_ignores_day_part() {
        assert_eq!(parse_year_month("2025-01-15").unwrap(), (2025, 1));
        assert_eq!(parse_year_month("2025-12").unwrap(), (2025, 12));
        assert!(parse_year_month("2025-00").is_err());
    }

    #[test]
    fn iso_week_uses_iso_year() {
        // 2021-01-01 falls in ISO week 53 of 2020.
        let d = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(iso_week_period(d), "2020-W53");
    }
}
