//! TIGGE control forecasts from the ECMWF public dataset archive.
//!
//! Same access path and monthly request shape as SEAS5, with the TIGGE
//! archive keys: ECMWF origin, control forecast, 6-hourly steps to 360h.

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

pub const DATASET: &str = "tigge";

fn steps() -> String {
    (0..=360)
        .step_by(6)
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn month_params(
    year: i32,
    month: u32,
    bbox: &BBox,
    codes: &[&str],
    last_updated: NaiveDate,
) -> Result<Value> {
    let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        crate::utils::error::EoError::InvalidPeriodError {
            value: format!("{:04}-{:02}", year, month),
        }
    })?;
    let month_end = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
        .unwrap_or(from);
    let to = month_end.min(last_updated);

    Ok(json!({
        "dataset": DATASET,
        "class": "ti",
        "expver": "prod",
        "origin": "ecmf",
        "type": "cf",
        "levtype": "sfc",
        "date": format!("{}/to/{}", from.format("%Y-%m-%d"), to.format("%Y-%m-%d")),
        "grid": "0.25/0.25",
        "area": bbox.mars_area(),
        "param": codes.join("/"),
        "time": "00",
        "step": steps(),
    }))
}

struct TiggeFetcher<'a> {
    client: &'a JobClient,
    bbox: BBox,
    codes: Vec<&'static str>,
    prefix: String,
    last_updated: NaiveDate,
}

#[async_trait]
impl PeriodFetcher for TiggeFetcher<'_> {
    fn file_name(&self, period: &FetchPeriod) -> String {
        format!("{}_{}.grib", self.prefix, period)
    }

    async fn fetch(&self, period: &FetchPeriod, target: &Path) -> Result<()> {
        let FetchPeriod::Month { year, month } = *period else {
            unreachable!("TIGGE downloads are monthly");
        };
        let params = month_params(year, month, &self.bbox, &self.codes, self.last_updated)?;
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
                 and will be downloaded regardless of cache",
                year,
                month
            );
            true
        }
    }
}

/// Retrieve TIGGE control forecasts for a bbox and variables between start
/// and end month, saving monthly grib files as `{prefix}_{YYYY-MM}.grib`.
pub async fn download(
    client: &JobClient,
    start: &str,
    end: &str,
    bbox: BBox,
    dirname: impl AsRef<Path>,
    prefix: &str,
    variables: &[String],
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    let (start_year, start_month) = parse_year_month(start)?;
    let (end_year, end_month) = parse_year_month(end)?;

    let cache = DownloadCache::open(dirname)?;
    let fetcher = TiggeFetcher {
        client,
        bbox,
        codes: variable_codes(variables)?,
        prefix: prefix.to_string(),
        last_updated: last_updated_date(),
    };
    let periods: Vec<FetchPeriod> = iter_months(start_year, start_month, end_year, end_month)
        .map(|(year, month)| FetchPeriod::Month { year, month })
        .collect();

    retrieve_periods(&fetcher, &periods, &cache, !overwrite).await
}
