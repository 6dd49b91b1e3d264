//! ECMWF forecast archive and open data adapters.

pub mod ifs;
pub mod seas5;
pub mod tigge;

use chrono::{Datelike, Duration, NaiveDate, Utc};

use crate::utils::error::{EoError, Result};

/// MARS parameter codes for the variable names shared with the CDS adapters.
pub fn variable_code(name: &str) -> Result<&'static str> {
    match name {
        "total_precipitation" => Ok("228"),
        "2m_temperature" => Ok("167"),
        other => Err(EoError::InvalidValueError {
            field: "variable".to_string(),
            value: other.to_string(),
            reason: "No MARS parameter code known for this variable".to_string(),
        }),
    }
}

pub fn variable_codes(names: &[String]) -> Result<Vec<&'static str>> {
    names.iter().map(|n| variable_code(n)).collect()
}

/// Last date for which the forecast archives can be assumed complete. The
/// feeds trail roughly two days behind, so only from the 3rd of a month can
/// the previous month be trusted in full.
pub fn last_updated_date() -> NaiveDate {
    Utc::now().date_naive() - Duration::days(3)
}

/// Whether a month lies entirely before the last-updated cutoff.
pub fn month_is_complete(year: i32, month: u32, last_updated: NaiveDate) -> bool {
    (year, month) < (last_updated.year(), last_updated.month())
}
