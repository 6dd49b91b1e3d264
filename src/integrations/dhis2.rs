//! Export harmonized records to the JSON format used by the DHIS2 Web API.

use serde::{Deserialize, Serialize};

use crate::core::time::{detect_period_type, PeriodType};
use crate::domain::model::Record;
use crate::utils::error::{EoError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub data_element: String,
    pub org_unit: String,
    pub period: String,
    pub value: String,
}

/// The `dataValues` payload accepted by the DHIS2 dataValueSets endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dhis2Payload {
    pub data_values: Vec<DataValue>,
}

/// Convert a period or datetime string to a DHIS2 period code. Time-of-day
/// after a space (as produced by datetime-typed columns) is ignored.
pub fn parse_period(value: &str) -> Result<String> {
    let period = value.split(' ').next().unwrap_or("").trim();
    match detect_period_type(period) {
        Some(PeriodType::Day) => Ok(period.replace('-', "")),
        Some(PeriodType::Month) => Ok(period.replace('-', "")),
        Some(PeriodType::Year) => Ok(period.to_string()),
        Some(PeriodType::Week) => Err(EoError::processing(format!(
            "Period type WEEK not yet supported: '{}'",
            period
        ))),
        None => Err(EoError::InvalidPeriodError {
            value: value.to_string(),
        }),
    }
}

/// Format a numeric value for DHIS2: plain decimal notation, no scientific
/// notation, no trailing zeros.
pub fn format_value(value: f64) -> String {
    // Rust's Display for f64 is the shortest round-trip decimal form and
    // never switches to exponent notation.
    format!("{}", value)
}

/// Translate records to the DHIS2 dataValueSets JSON payload. Rows with a
/// null or missing value are dropped.
pub fn records_to_dhis2_json(
    records: &[Record],
    data_element_id: &str,
    org_unit_col: &str,
    period_col: &str,
    value_col: &str,
) -> Result<Dhis2Payload> {
    let mut data_values = Vec::with_capacity(records.len());

    for record in records {
        let value = match record.get(value_col) {
            None | Some(serde_json::Value::Null) => continue,
            Some(serde_json::Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => format_value(v),
                _ => continue,
            },
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let org_unit = record
            .get_str(org_unit_col)
            .ok_or_else(|| EoError::MissingFieldError {
                field: org_unit_col.to_string(),
            })?;
        let period = record
            .get_str(period_col)
            .ok_or_else(|| EoError::MissingFieldError {
                field: period_col.to_string(),
            })?;

        data_values.push(DataValue {
            data_element: data_element_id.to_string(),
            org_unit: org_unit.to_string(),
            period: parse_period(period)?,
            value,
        });
    }

    Ok(Dhis2Payload { data_values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_daily_monthly_and_yearly_periods() {
        assert_eq!(parse_period("2024-01-15").unwrap(), "20240115");
        assert_eq!(parse_period("20240115").unwrap(), "20240115");
        assert_eq!(parse_period("2024-01").unwrap(), "202401");
        assert_eq!(parse_period("202401").unwrap(), "202401");
        assert_eq!(parse_period("2024").unwrap(), "2024");
    }

    #[test]
    fn ignores_time_of_day_suffix() {
        assert_eq!(parse_period("2024-01-15 00:00:00").unwrap(), "20240115");
    }

    #[test]
    fn weekly_and_unknown_periods_are_errors() {
        assert!(parse_period("2024-W05").is_err());
        assert!(parse_period("January 2024").is_err());
    }

    #[test]
    fn small_values_are_not_scientific_notation() {
        let formatted = format_value(8.24148e-05);
        assert_eq!(formatted, "0.0000824148");
        assert!(!formatted.to_lowercase().contains('e'));

        let tiny = format_value(1e-10);
        assert_eq!(tiny, "0.0000000001");
    }

    #[test]
    fn integral_floats_have_no_trailing_zeros() {
        assert_eq!(format_value(25.0), "25");
        assert_eq!(format_value(27.5), "27.5");
    }
}
