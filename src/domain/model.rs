use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One tabular row: column name to JSON value. The exporters consume slices
/// of these as their harmonized input table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: impl Into<serde_json::Value>) {
        self.data.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data.get(column)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.data.get(column).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.data.get(column).and_then(|v| v.as_f64())
    }
}

/// The downloadable unit a provider adapter works in. Each period maps to
/// exactly one file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchPeriod {
    Year(i32),
    Month { year: i32, month: u32 },
    Day(NaiveDate),
    /// Forecast step within a model run day (IFS open data).
    DayStep { day: NaiveDate, step: u32 },
}

impl std::fmt::Display for FetchPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchPeriod::Year(year) => write!(f, "{:04}", year),
            FetchPeriod::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            FetchPeriod::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            FetchPeriod::DayStep { day, step } => {
                write!(f, "{} step {}", day.format("%Y-%m-%d"), step)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accessors() {
        let mut record = Record::new();
        record.set("org_unit", "OU1");
        record.set("value", 27.5);
        assert_eq!(record.get_str("org_unit"), Some("OU1"));
        assert_eq!(record.get_f64("value"), Some(27.5));
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn period_display_forms() {
        assert_eq!(FetchPeriod::Year(2024).to_string(), "2024");
        assert_eq!(
            FetchPeriod::Month {
                year: 2024,
                month: 3
            }
            .to_string(),
            "2024-03"
        );
    }
}
