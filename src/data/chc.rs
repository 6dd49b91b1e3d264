//! CHIRPS v3 daily precipitation from the Climate Hazards Center.
//!
//! Published as one global GeoTIFF per day under a fixed directory layout:
//!
//! FINAL:  /products/CHIRPS/v3.0/daily/final/{rnl|sat}/{YYYY}/
//!         chirps-v3.0.{rnl|sat}.{YYYY}.{MM}.{DD}.tif
//! PRELIM: /products/CHIRPS/v3.0/daily/prelim/sat/{YYYY}/
//!         chirps-v3.0.prelim.{YYYY}.{MM}.{DD}.tif

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::core::cache::DownloadCache;
use crate::core::retrieve::retrieve_periods;
use crate::core::time::{ensure_date, iter_days};
use crate::data::download_to_file;
use crate::domain::model::FetchPeriod;
use crate::domain::ports::PeriodFetcher;
use crate::utils::error::{EoError, Result};

pub const DEFAULT_BASE_URL: &str = "https://data.chc.ucsb.edu";

/// "final" is the stable product recommended for analysis; "prelim" is the
/// near-real-time preliminary product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Final,
    Prelim,
}

/// For final products both "rnl" and "sat" exist; the prelim directory is
/// "sat" but the filename tag is "prelim".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    #[default]
    Rnl,
    Sat,
}

impl Flavor {
    fn as_str(&self) -> &'static str {
        match self {
            Flavor::Rnl => "rnl",
            Flavor::Sat => "sat",
        }
    }
}

/// CHC URL for a single CHIRPS v3 daily GeoTIFF.
pub fn url_for_day(base_url: &str, day: NaiveDate, stage: Stage, flavor: Flavor) -> Result<String> {
    let base = base_url.trim_end_matches('/');
    match stage {
        Stage::Final => Ok(format!(
            "{}/products/CHIRPS/v3.0/daily/final/{}/{}/chirps-v3.0.{}.{}.{:02}.{:02}.tif",
            base,
            flavor.as_str(),
            day.year(),
            flavor.as_str(),
            day.year(),
            day.month(),
            day.day()
        )),
        Stage::Prelim => {
            if flavor != Flavor::Sat {
                return Err(EoError::InvalidValueError {
                    field: "flavor".to_string(),
                    value: flavor.as_str().to_string(),
                    reason: "For stage 'prelim', flavor must be 'sat'".to_string(),
                });
            }
            Ok(format!(
                "{}/products/CHIRPS/v3.0/daily/prelim/sat/{}/chirps-v3.0.prelim.{}.{:02}.{:02}.tif",
                base,
                day.year(),
                day.year(),
                day.month(),
                day.day()
            ))
        }
    }
}

struct ChirpsFetcher {
    http: reqwest::Client,
    base_url: String,
    stage: Stage,
    flavor: Flavor,
    prefix: String,
}

#[async_trait]
impl PeriodFetcher for ChirpsFetcher {
    fn file_name(&self, period: &FetchPeriod) -> String {
        format!("{}_{}.tif", self.prefix, period)
    }

    async fn fetch(&self, period: &FetchPeriod, target: &Path) -> Result<()> {
        let FetchPeriod::Day(day) = *period else {
            unreachable!("CHIRPS downloads are daily");
        };
        let url = url_for_day(&self.base_url, day, self.stage, self.flavor)?;
        tracing::info!("Reading {} -> {}", day, url);
        download_to_file(&self.http, &url, target).await
    }
}

/// Retrieve daily CHIRPS v3 GeoTIFFs between start and end (inclusive),
/// saved as `{prefix}_{date}.tif`.
#[allow(clippy::too_many_arguments)]
pub async fn retrieve(
    start: &str,
    end: &str,
    dirname: impl AsRef<Path>,
    prefix: &str,
    stage: Stage,
    flavor: Flavor,
    base_url: Option<&str>,
    skip_existing: bool,
) -> Result<Vec<PathBuf>> {
    let start = ensure_date(start)?;
    let end = ensure_date(end)?;
    if end < start {
        return Err(EoError::processing("end must be on/after start"));
    }

    tracing::info!("Fetching CHIRPS v3 daily from {} to {} (inclusive)", start, end);
    tracing::info!("Stage/flavor: {:?}/{:?}", stage, flavor);

    let cache = DownloadCache::open(dirname)?;
    let fetcher = ChirpsFetcher {
        http: reqwest::Client::new(),
        base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        stage,
        flavor,
        prefix: prefix.to_string(),
    };
    let periods: Vec<FetchPeriod> = iter_days(start, end).map(FetchPeriod::Day).collect();

    retrieve_periods(&fetcher, &periods, &cache, skip_existing).await
}
