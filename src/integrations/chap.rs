//! Export harmonized records to a Chap-compatible wide CSV.
//!
//! Chap (Climate Health Analytics Platform) trains on a simple wide CSV:
//! one row per (time_period, location), with reserved columns `time_period`,
//! `location`, `disease_cases` (required) and `population` (optional); every
//! other column is treated as a covariate.
//!
//! Input columns may be named anything, so the caller supplies an explicit
//! mapping from Chap-reserved field to input column rather than this module
//! guessing. Missing periods are never imputed; gaps are detected and
//! reported according to the continuity policy, since silently filling them
//! would fabricate training signal.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use chrono::{Duration, NaiveDate, Weekday};
use regex::Regex;
use std::sync::OnceLock;

use crate::core::time::{iso_week_period, iter_months};
use crate::domain::model::Record;
use crate::utils::error::{EoError, Result};

pub const REQUIRED_RESERVED_FIELDS: &[&str] = &["time_period", "location", "disease_cases"];
pub const OPTIONAL_RESERVED_FIELDS: &[&str] = &["population"];

/// Metadata columns dropped by default when present.
pub const DEFAULT_DROP_COLS: &[&str] = &["org_name", "population_year"];

const MAX_MISSING_PER_LOCATION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freq {
    #[default]
    Monthly,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuityPolicy {
    #[default]
    Error,
    Warn,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct ChapExportOptions {
    pub freq: Freq,
    pub continuity_policy: ContinuityPolicy,
    /// Include all non-reserved, non-dropped columns as covariates.
    pub include_other_cols: bool,
    /// Explicit covariate list; takes precedence over `include_other_cols`.
    pub value_cols: Option<Vec<String>>,
    pub drop_cols: Vec<String>,
    /// Sort rows by (location, time_period) for deterministic output.
    pub sort: bool,
}

impl Default for ChapExportOptions {
    fn default() -> Self {
        Self {
            freq: Freq::Monthly,
            continuity_policy: ContinuityPolicy::Error,
            include_other_cols: true,
            value_cols: None,
            drop_cols: DEFAULT_DROP_COLS.iter().map(|c| c.to_string()).collect(),
            sort: true,
        }
    }
}

fn yyyymm_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{6}$").unwrap())
}

fn yyyy_dash_mm_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}$").unwrap())
}

fn iso_week_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-W\d{2}$").unwrap())
}

/// Normalize a period-like string to the Chap form for the frequency:
/// monthly `YYYY-MM`, weekly ISO `YYYY-Wnn`. Date-like values are accepted
/// and reduced to their period.
pub fn normalize_time_period(value: &str, freq: Freq) -> Result<String> {
    let s = value.trim();
    match freq {
        Freq::Monthly => {
            let normalized = if yyyymm_re().is_match(s) {
                format!("{}-{}", &s[..4], &s[4..6])
            } else if yyyy_dash_mm_re().is_match(s) {
                s.to_string()
            } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                date.format("%Y-%m").to_string()
            } else {
                return Err(EoError::InvalidPeriodError {
                    value: value.to_string(),
                });
            };
            let month: u32 = normalized[5..7].parse().unwrap_or(0);
            if !(1..=12).contains(&month) {
                return Err(EoError::InvalidPeriodError {
                    value: value.to_string(),
                });
            }
            Ok(normalized)
        }
        Freq::Weekly => {
            if iso_week_re().is_match(s) {
                let week: u32 = s[6..8].parse().unwrap_or(0);
                if !(1..=53).contains(&week) {
                    return Err(EoError::InvalidPeriodError {
                        value: value.to_string(),
                    });
                }
                return Ok(s.to_string());
            }
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                EoError::InvalidPeriodError {
                    value: value.to_string(),
                }
            })?;
            Ok(iso_week_period(date))
        }
    }
}

fn month_of(period: &str) -> Result<(i32, u32)> {
    if !yyyy_dash_mm_re().is_match(period) {
        return Err(EoError::InvalidPeriodError {
            value: period.to_string(),
        });
    }
    let year = period[..4].parse().ok();
    let month = period[5..7].parse().ok();
    match (year, month) {
        (Some(y), Some(m)) if (1..=12).contains(&m) => Ok((y, m)),
        _ => Err(EoError::InvalidPeriodError {
            value: period.to_string(),
        }),
    }
}

fn week_start_of(period: &str) -> Result<NaiveDate> {
    if !iso_week_re().is_match(period) {
        return Err(EoError::InvalidPeriodError {
            value: period.to_string(),
        });
    }
    let year: i32 = period[..4].parse().unwrap_or(0);
    let week: u32 = period[6..8].parse().unwrap_or(0);
    NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(|| {
        EoError::InvalidPeriodError {
            value: period.to_string(),
        }
    })
}

/// Detect missing periods per location, each checked between its own min and
/// max period. Returns `{location: [missing periods...]}` (capped per
/// location); empty means continuity holds. Nothing is fixed here, only
/// reported.
pub fn find_temporal_gaps(
    rows: &[(String, String)],
    freq: Freq,
) -> Result<BTreeMap<String, Vec<String>>> {
    let mut by_location: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (location, period) in rows {
        by_location
            .entry(location.as_str())
            .or_default()
            .insert(period.as_str());
    }

    let mut gaps = BTreeMap::new();
    for (location, periods) in by_location {
        if periods.len() <= 1 {
            continue;
        }
        let missing: Vec<String> = match freq {
            Freq::Monthly => {
                let parsed: Vec<(i32, u32)> = periods
                    .iter()
                    .map(|p| month_of(p))
                    .collect::<Result<_>>()?;
                let &(min_y, min_m) = parsed.iter().min().expect("non-empty");
                let &(max_y, max_m) = parsed.iter().max().expect("non-empty");
                let present: HashSet<(i32, u32)> = parsed.into_iter().collect();
                iter_months(min_y, min_m, max_y, max_m)
                    .filter(|ym| !present.contains(ym))
                    .map(|(y, m)| format!("{:04}-{:02}", y, m))
                    .take(MAX_MISSING_PER_LOCATION)
                    .collect()
            }
            Freq::Weekly => {
                let starts: Vec<NaiveDate> = periods
                    .iter()
                    .map(|p| week_start_of(p))
                    .collect::<Result<_>>()?;
                let min = *starts.iter().min().expect("non-empty");
                let max = *starts.iter().max().expect("non-empty");
                let present: HashSet<NaiveDate> = starts.into_iter().collect();
                let weeks = ((max - min).num_days() / 7) as usize;
                (0..=weeks)
                    .map(|i| min + Duration::weeks(i as i64))
                    .filter(|start| !present.contains(start))
                    .map(iso_week_period)
                    .take(MAX_MISSING_PER_LOCATION)
                    .collect()
            }
        };
        if !missing.is_empty() {
            gaps.insert(location.to_string(), missing);
        }
    }
    Ok(gaps)
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check_column_map(
    column_map: &HashMap<String, String>,
    records: &[Record],
) -> Result<()> {
    let missing_keys: Vec<&str> = REQUIRED_RESERVED_FIELDS
        .iter()
        .filter(|k| !column_map.contains_key(**k))
        .copied()
        .collect();
    if !missing_keys.is_empty() {
        return Err(EoError::MissingFieldError {
            field: format!(
                "column_map is missing required Chap fields: {}",
                missing_keys.join(", ")
            ),
        });
    }

    let mut present: HashSet<&str> = HashSet::new();
    for record in records {
        present.extend(record.data.keys().map(String::as_str));
    }
    let missing_inputs: Vec<&str> = column_map
        .values()
        .filter(|c| !present.contains(c.as_str()))
        .map(String::as_str)
        .collect();
    if !missing_inputs.is_empty() {
        return Err(EoError::MissingFieldError {
            field: format!("input is missing mapped columns: {}", missing_inputs.join(", ")),
        });
    }
    Ok(())
}

/// Convert records to Chap-compatible wide CSV text.
pub fn records_to_chap_csv(
    records: &[Record],
    column_map: &HashMap<String, String>,
    options: &ChapExportOptions,
) -> Result<String> {
    check_column_map(column_map, records)?;

    // Rename mapped input columns to the reserved field names and drop the
    // default metadata columns, then normalize the period strings.
    let rename: HashMap<&str, &str> = column_map
        .iter()
        .map(|(field, input)| (input.as_str(), field.as_str()))
        .collect();
    let drop: HashSet<&str> = options.drop_cols.iter().map(String::as_str).collect();

    let mut rows: Vec<HashMap<String, serde_json::Value>> = Vec::with_capacity(records.len());
    for record in records {
        let mut row = HashMap::with_capacity(record.data.len());
        for (column, value) in &record.data {
            let name = rename.get(column.as_str()).copied().unwrap_or(column.as_str());
            if drop.contains(column.as_str()) && !rename.contains_key(column.as_str()) {
                continue;
            }
            row.insert(name.to_string(), value.clone());
        }
        let period = row
            .get("time_period")
            .map(cell_text)
            .unwrap_or_default();
        let normalized = normalize_time_period(&period, options.freq)?;
        row.insert(
            "time_period".to_string(),
            serde_json::Value::String(normalized),
        );
        rows.push(row);
    }

    if options.continuity_policy != ContinuityPolicy::Ignore {
        let pairs: Vec<(String, String)> = rows
            .iter()
            .map(|row| {
                (
                    row.get("location").map(cell_text).unwrap_or_default(),
                    row.get("time_period").map(cell_text).unwrap_or_default(),
                )
            })
            .collect();
        let gaps = find_temporal_gaps(&pairs, options.freq)?;
        if !gaps.is_empty() {
            let sample: Vec<String> = gaps
                .iter()
                .take(5)
                .map(|(loc, missing)| format!("{}: {:?}", loc, missing))
                .collect();
            let message = format!(
                "Temporal continuity check failed: missing periods for {} location(s). Examples: {}",
                gaps.len(),
                sample.join("; ")
            );
            match options.continuity_policy {
                ContinuityPolicy::Error => return Err(EoError::processing(message)),
                ContinuityPolicy::Warn => tracing::warn!("{}", message),
                ContinuityPolicy::Ignore => {}
            }
        }
    }

    // Reserved columns first, in the Chap-friendly order, then covariates.
    let mut ordered_cols: Vec<String> = REQUIRED_RESERVED_FIELDS
        .iter()
        .map(|c| c.to_string())
        .collect();
    for field in OPTIONAL_RESERVED_FIELDS {
        if column_map.contains_key(*field) {
            ordered_cols.push(field.to_string());
        }
    }

    let reserved: HashSet<String> = ordered_cols.iter().cloned().collect();
    let covariates: Vec<String> = if let Some(value_cols) = &options.value_cols {
        let mut present: HashSet<&str> = HashSet::new();
        for row in &rows {
            present.extend(row.keys().map(String::as_str));
        }
        if let Some(missing) = value_cols.iter().find(|c| !present.contains(c.as_str())) {
            return Err(EoError::MissingFieldError {
                field: format!("value_cols not found in input: {}", missing),
            });
        }
        value_cols.clone()
    } else if options.include_other_cols {
        // Records carry no column order, so covariates are sorted by name
        // for deterministic output.
        let mut other: BTreeSet<String> = BTreeSet::new();
        for row in &rows {
            other.extend(
                row.keys()
                    .filter(|c| !reserved.contains(c.as_str()))
                    .cloned(),
            );
        }
        other.into_iter().collect()
    } else {
        Vec::new()
    };
    ordered_cols.extend(covariates.into_iter().filter(|c| !reserved.contains(c.as_str())));

    if options.sort {
        rows.sort_by(|a, b| {
            let key = |row: &HashMap<String, serde_json::Value>| {
                (
                    row.get("location").map(cell_text).unwrap_or_default(),
                    row.get("time_period").map(cell_text).unwrap_or_default(),
                )
            };
            key(a).cmp(&key(b))
        });
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&ordered_cols)?;
    for row in &rows {
        let cells: Vec<String> = ordered_cols
            .iter()
            .map(|col| row.get(col).map(cell_text).unwrap_or_default())
            .collect();
        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EoError::processing(format!("CSV buffer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| EoError::processing(format!("CSV was not UTF-8: {}", e)))
}

/// Like [`records_to_chap_csv`] but writing to a file.
pub fn write_chap_csv(
    records: &[Record],
    column_map: &HashMap<String, String>,
    options: &ChapExportOptions,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let csv_text = records_to_chap_csv(records, column_map, options)?;
    std::fs::write(output_path, csv_text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_monthly_formats() {
        assert_eq!(normalize_time_period("199801", Freq::Monthly).unwrap(), "1998-01");
        assert_eq!(normalize_time_period("1998-02", Freq::Monthly).unwrap(), "1998-02");
        assert_eq!(
            normalize_time_period("1998-03-15", Freq::Monthly).unwrap(),
            "1998-03"
        );
    }

    #[test]
    fn rejects_invalid_monthly_values() {
        assert!(normalize_time_period("1998-13", Freq::Monthly).is_err());
        assert!(normalize_time_period("not-a-period", Freq::Monthly).is_err());
    }

    #[test]
    fn normalizes_weekly_from_date_like() {
        let out = normalize_time_period("2020-01-01", Freq::Weekly).unwrap();
        assert_eq!(out, "2020-W01");
        assert_eq!(
            normalize_time_period("2023-W05", Freq::Weekly).unwrap(),
            "2023-W05"
        );
        assert!(normalize_time_period("2023-W60", Freq::Weekly).is_err());
    }

    #[test]
    fn finds_monthly_gaps_between_min_and_max_per_location() {
        let rows = vec![
            ("A".to_string(), "2023-01".to_string()),
            ("A".to_string(), "2023-03".to_string()),
            ("B".to_string(), "2023-01".to_string()),
            ("B".to_string(), "2023-02".to_string()),
        ];
        let gaps = find_temporal_gaps(&rows, Freq::Monthly).unwrap();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps["A"], vec!["2023-02"]);
    }

    #[test]
    fn finds_weekly_gaps_across_year_boundary() {
        let rows = vec![
            ("A".to_string(), "2020-W52".to_string()),
            ("A".to_string(), "2021-W01".to_string()),
            ("A".to_string(), "2021-W03".to_string()),
        ];
        let gaps = find_temporal_gaps(&rows, Freq::Weekly).unwrap();
        // 2020 has 53 ISO weeks, so both W53 and 2021-W02 are missing.
        assert_eq!(gaps["A"], vec!["2020-W53", "2021-W02"]);
    }

    #[test]
    fn single_period_locations_have_no_gaps() {
        let rows = vec![("A".to_string(), "2023-01".to_string())];
        assert!(find_temporal_gaps(&rows, Freq::Monthly).unwrap().is_empty());
    }
}
