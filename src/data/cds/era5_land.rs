//! ERA5-Land retrievals from the Copernicus Climate Data Store.
//!
//! The hourly product only allows one month per request, so the date range is
//! split into per-month jobs saved as `{prefix}_{YYYY-MM}.nc`. Monthly means
//! go out as a single job cached under a request-hash file name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::cache::{request_cache_key, DownloadCache};
use crate::core::retrieve::retrieve_periods;
use crate::core::time::{days_in_month, iter_months, parse_year_month};
use crate::core::types::BBox;
use crate::data::jobs::JobClient;
use crate::domain::model::FetchPeriod;
use crate::domain::ports::PeriodFetcher;
use crate::utils::error::Result;

pub const HOURLY_DATASET: &str = "reanalysis-era5-land";
pub const MONTHLY_DATASET: &str = "reanalysis-era5-land-monthly-means";

pub const DEFAULT_VARIABLES: &[&str] = &["2m_temperature", "total_precipitation"];

fn variables_or_default(variables: Option<&[String]>) -> Vec<String> {
    match variables {
        Some(vars) if !vars.is_empty() => vars.to_vec(),
        _ => DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect(),
    }
}

/// Request parameters for one month of hourly data.
fn hourly_month_params(year: i32, month: u32, bbox: &BBox, variables: &[String]) -> Value {
    let days: Vec<String> = (1..=days_in_month(year, month))
        .map(|day| format!("{:02}", day))
        .collect();
    let times: Vec<String> = (0..24).map(|h| format!("{:02}:00", h)).collect();
    json!({
        "variable": variables,
        "year": year.to_string(),
        "month": [format!("{:02}", month)],
        "day": days,
        "time": times,
        "area": bbox.area_nwse(),
        "data_format": "netcdf",
        "download_format": "unarchived",
    })
}

struct HourlyFetcher<'a> {
    client: &'a JobClient,
    bbox: BBox,
    variables: Vec<String>,
    prefix: String,
}

#[async_trait]
impl PeriodFetcher for HourlyFetcher<'_> {
    fn file_name(&self, period: &FetchPeriod) -> String {
        format!("{}_{}.nc", self.prefix, period)
    }

    async fn fetch(&self, period: &FetchPeriod, target: &Path) -> Result<()> {
        let FetchPeriod::Month { year, month } = *period else {
            unreachable!("ERA5-Land hourly downloads are monthly");
        };
        let params = hourly_month_params(year, month, &self.bbox, &self.variables);
        tracing::info!("Downloading data from CDS API...");
        let handle = self.client.submit(HOURLY_DATASET, params).await?;
        self.client.wait_and_download(&handle, target).await
    }
}

/// Retrieve hourly ERA5-Land data for a bbox between start and end month
/// (`YYYY-MM` or full dates), one netcdf file per month. Returns all file
/// paths, cached months included.
pub async fn retrieve_hourly(
    client: &JobClient,
    start: &str,
    end: &str,
    bbox: BBox,
    dirname: impl AsRef<Path>,
    prefix: &str,
    skip_existing: bool,
    variables: Option<&[String]>,
) -> Result<Vec<PathBuf>> {
    let (start_year, start_month) = parse_year_month(start)?;
    let (end_year, end_month) = parse_year_month(end)?;

    let cache = DownloadCache::open(dirname)?;
    let fetcher = HourlyFetcher {
        client,
        bbox,
        variables: variables_or_default(variables),
        prefix: prefix.to_string(),
    };
    let periods: Vec<FetchPeriod> = iter_months(start_year, start_month, end_year, end_month)
        .map(|(year, month)| FetchPeriod::Month { year, month })
        .collect();

    retrieve_periods(&fetcher, &periods, &cache, skip_existing).await
}

/// Request parameters for monthly averaged reanalysis.
fn monthly_params(years: &[i32], months: &[u32], bbox: &BBox, variables: &[String]) -> Value {
    json!({
        "product_type": ["monthly_averaged_reanalysis"],
        "variable": variables,
        "year": years.iter().map(|y| y.to_string()).collect::<Vec<_>>(),
        "month": months.iter().map(|m| format!("{:02}", m)).collect::<Vec<_>>(),
        "time": ["00:00"],
        "area": bbox.area_nwse(),
        "data_format": "netcdf",
        "download_format": "unarchived",
    })
}

/// Retrieve monthly ERA5-Land means for the given years and months as a single
/// job. The result is cached by a hash of the request parameters, so repeated
/// calls with the same arguments reuse the downloaded file.
pub async fn retrieve_monthly(
    client: &JobClient,
    years: &[i32],
    months: &[u32],
    bbox: BBox,
    dirname: impl AsRef<Path>,
    variables: Option<&[String]>,
) -> Result<PathBuf> {
    let variables = variables_or_default(variables);
    let params = monthly_params(years, months, &bbox, &variables);

    let cache = DownloadCache::open(dirname)?;
    let file_name = request_cache_key("era5_land_monthly", &params, "nc");
    let target = cache.target(&file_name);
    if target.exists() {
        tracing::info!("Loading from cache: {}", target.display());
        return Ok(target);
    }

    tracing::info!("Downloading data from CDS API...");
    let handle = client.submit(MONTHLY_DATASET, params).await?;
    client.wait_and_download(&handle, &target).await?;
    Ok(target)
}
