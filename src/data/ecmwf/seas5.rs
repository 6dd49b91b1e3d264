//! SEAS5 seasonal forecasts from the ECMWF archive.
//!
//! Ensemble-mean surface forecasts, one MARS request per month of forecast
//! initializations. The archive trails about two days behind real time, so
//! trailing months are re-downloaded regardless of cache until they are
//! expected to be complete.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::core::cache::DownloadCache;
use crate::core::retrieve::retrieve_periods;
use crate::core::time::{days_in_month, iter_months, parse_year_month};
use crate::core::types::BBox;
use crate::data::ecmwf::{last_updated_date, month_is_complete, variable_codes};
use crate::data::jobs::JobClient;
use crate::domain::model::FetchPeriod;
use crate::domain::ports::PeriodFetcher;
use crate::utils::error::Result;

pub const DATASET: &str = "seas5";

/// Native SEAS5 resolution; finer values are interpolated server-side.
pub const DEFAULT_RESOLUTION: f64 = 0.25;

/// Forecast horizon: 7 months of 6-hourly steps.
const HOURS_IN_7_MONTHS: u32 = 24 * 30 * 7;

fn month_params(
    year: i32,
    month: u32,
    bbox: &BBox,
    codes: &[&str],
    resolution: f64,
    last_updated: NaiveDate,
) -> Result<Value> {
    let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        crate::utils::error::EoError::InvalidPeriodError {
            value: format!("{:04}-{:02}", year, month),
        }
    })?;
    let month_end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
        .unwrap_or(from);
    // Never request past the last date the archive is expected to have.
    let to = month_end.min(last_updated);

    Ok(json!({
        "dataset": DATASET,
        "class": "od",
        "stream": "mmsf",
        "system": "5",
        "method": "1",
        "expver": "1",
        "type": "em",
        "date": format!("{}/to/{}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d")),
        "grid": format!("{:.2}/{:.2}", resolution, resolution),
        "area": bbox.mars_area(),
        "levtype": "sfc",
        "param": codes.join("/"),
        "time": "00",
        "step": format!("0/to/{}/by/6", HOURS_IN_7_MONTHS),
    }))
}

struct Seas5Fetcher<'a> {
    client: &'a JobClient,
    bbox: BBox,
    codes: Vec<&'static str>,
    resolution: f64,
    prefix: String,
    last_updated: NaiveDate,
}

#[async_trait]
impl PeriodFetcher for Seas5Fetcher<'_> {
    fn file_name(&self, period: &FetchPeriod) -> String {
        format!("{}_{}.grib", self.prefix, period)
    }

    async fn fetch(&self, period: &FetchPeriod, target: &Path) -> Result<()> {
        let FetchPeriod::Month { year, month } = *period else {
            unreachable!("SEAS5 downloads are monthly");
        };
        let params = month_params(
            year,
            month,
            &self.bbox,
            &self.codes,
            self.resolution,
            self.last_updated,
        )?;
        tracing::info!("Downloading data from ECMWF API...");
        let handle = self.client.submit(DATASET, params).await?;
        self.client.wait_and_download(&handle, target).await
    }

    fn force_refresh(&self, period: &FetchPeriod) -> bool {
        let FetchPeriod::Month { year, month } = *period else {
            return false;
        };
        if month_is_complete(year, month, self.last_updated) {
            false
        } else {
            tracing::warn!(
                "Month {:04}-{:02} is expected to be incomplete (~2 days of lag) \
                 and will be downloaded regardless of cache. \
                 Latest available date expected: {}",
                year,
                month,
                self.last_updated
            );
            true
        }
    }
}

/// Retrieve SEAS5 6-hourly forecasts for a bbox and variables between start
/// and end month, saving monthly grib files as `{prefix}_{YYYY-MM}.grib`.
#[allow(clippy::too_many_arguments)]
pub async fn download(
    client: &JobClient,
    start: &str,
    end: &str,
    bbox: BBox,
    dirname: impl AsRef<Path>,
    prefix: &str,
    variables: &[String],
    resolution: Option<f64>,
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    let (start_year, start_month) = parse_year_month(start)?;
    let (end_year, end_month) = parse_year_month(end)?;

    let cache = DownloadCache::open(dirname)?;
    let fetcher = Seas5Fetcher {
        client,
        bbox,
        codes: variable_codes(variables)?,
        resolution: resolution.unwrap_or(DEFAULT_RESOLUTION),
        prefix: prefix.to_string(),
        last_updated: last_updated_date(),
    };
    let periods: Vec<FetchPeriod> = iter_months(start_year, start_month, end_year, end_month)
        .map(|(year, month)| FetchPeriod::Month { year, month })
        .collect();

    retrieve_periods(&fetcher, &periods, &cache, !overwrite).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BBox {
        BBox::new(-13.3, 6.9, -10.2, 10.0).unwrap()
    }

    #[test]
    fn request_covers_full_completed_month() {
        let last_updated = NaiveDate::from_ymd_opt(2025, 6, 28).unwrap();
        let params = month_params(2025, 2, &bbox(), &["167"], 0.25, last_updated).unwrap();
        assert_eq!(params["date"], "2025-02-01/to/2025-02-28");
        assert_eq!(params["step"], "0/to/5040/by/6");
        assert_eq!(params["grid"], "0.25/0.25");
        assert_eq!(params["type"], "em");
    }

    #[test]
    fn request_dates_clamped_to_last_updated() {
        let last_updated = NaiveDate::from_ymd_opt(2025, 6, 28).unwrap();
        let params = month_params(2025, 6, &bbox(), &["167", "228"], 0.25, last_updated).unwrap();
        assert_eq!(params["date"], "2025-06-01/to/2025-06-28");
        assert_eq!(params["param"], "167/228");
    }
}
