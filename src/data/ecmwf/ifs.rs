//! ECMWF IFS open data: real-time high-resolution forecasts served as plain
//! files from the open-data mirrors, no job protocol involved.
//!
//! The mirrors publish one grib2 file per forecast step. Only the midnight
//! model run is fetched; forecasts are available every 6 hours but the
//! downstream aggregations only need one run per day.
//!
//! Short open-data parameter names differ from the archive names, e.g.
//! `2t` (2 metre temperature) and `tp` (total precipitation).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::cache::DownloadCache;
use crate::core::retrieve::retrieve_periods;
use crate::core::time::{ensure_date, iter_days};
use crate::data::download_to_file;
use crate::domain::model::FetchPeriod;
use crate::domain::ports::PeriodFetcher;
use crate::utils::error::Result;

/// The ECMWF-hosted root. The same layout is mirrored on aws/google/azure,
/// which keep a longer history and throttle less.
pub const DEFAULT_BASE_URL: &str = "https://data.ecmwf.int/forecasts";

/// Full range of forecast steps: 3-hourly to 144h, then 6-hourly to 360h.
pub fn forecast_steps() -> Vec<u32> {
    (0..=144).step_by(3).chain((150..=360).step_by(6)).collect()
}

/// URL of a single forecast step file of the midnight run.
pub fn url_for_step(base_url: &str, day: NaiveDate, step: u32) -> String {
    let datestr = day.format("%Y%m%d");
    format!(
        "{}/{}/00z/ifs/0p25/oper/{}000000-{}h-oper-fc.grib2",
        base_url.trim_end_matches('/'),
        datestr,
        datestr,
        step
    )
}

struct IfsFetcher {
    http: reqwest::Client,
    base_url: String,
    prefix: String,
}

#[async_trait]
impl PeriodFetcher for IfsFetcher {
    fn file_name(&self, period: &FetchPeriod) -> String {
        let FetchPeriod::DayStep { day, step } = period else {
            unreachable!("IFS downloads are per forecast step");
        };
        format!(
            "{}_{}_{:03}.grib2",
            self.prefix,
            day.format("%Y-%m-%d"),
            step
        )
    }

    async fn fetch(&self, period: &FetchPeriod, target: &Path) -> Result<()> {
        let FetchPeriod::DayStep { day, step } = *period else {
            unreachable!("IFS downloads are per forecast step");
        };
        let url = url_for_step(&self.base_url, day, step);
        tracing::info!("Fetching step {} -> {}", step, url);
        download_to_file(&self.http, &url, target).await
    }
}

/// Download IFS forecast step files for each day between start and end
/// (inclusive, `YYYY-MM-DD`), saved as `{prefix}_{date}_{step}.grib2`.
pub async fn download(
    start: &str,
    end: &str,
    dirname: impl AsRef<Path>,
    prefix: &str,
    base_url: Option<&str>,
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    let start = ensure_date(start)?;
    let end = ensure_date(end)?;

    let cache = DownloadCache::open(dirname)?;
    let fetcher = IfsFetcher {
        http: reqwest::Client::new(),
        base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        prefix: prefix.to_string(),
    };

    let steps = forecast_steps();
    let periods: Vec<FetchPeriod> = iter_days(start, end)
        .flat_map(|day| steps.iter().map(move |&step| FetchPeriod::DayStep { day, step }))
        .collect();

    retrieve_periods(&fetcher, &periods, &cache, !overwrite).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_grid_switches_to_six_hourly_after_144() {
        let steps = forecast_steps();
        assert_eq!(steps.first(), Some(&0));
        assert_eq!(steps.last(), Some(&360));
        assert!(steps.contains(&144));
        assert!(steps.contains(&150));
        assert!(!steps.contains(&147));
        assert_eq!(steps.len(), 49 + 36);
    }

    #[test]
    fn builds_open_data_urls() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(
            url_for_step(DEFAULT_BASE_URL, day, 24),
            "https://data.ecmwf.int/forecasts/20250307/00z/ifs/0p25/oper/20250307000000-24h-oper-fc.grib2"
        );
    }
}
