//! WorldPop constrained population counts, one country GeoTIFF per year.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::core::cache::DownloadCache;
use crate::core::retrieve::retrieve_periods;
use crate::data::download_to_file;
use crate::domain::model::FetchPeriod;
use crate::domain::ports::PeriodFetcher;
use crate::utils::error::{EoError, Result};

pub const DEFAULT_BASE_URL: &str = "https://data.worldpop.org";

/// URL of the 100m constrained country GeoTIFF for a year (R2025A release).
pub fn url_country_for_year(base_url: &str, year: i32, country_code: &str) -> String {
    let filename = format!(
        "{}_pop_{}_CN_100m_R2025A_v1.tif",
        country_code.to_lowercase(),
        year
    );
    format!(
        "{}/GIS/Population/Global_2015_2030/R2025A/{}/{}/v1/100m/constrained/{}",
        base_url.trim_end_matches('/'),
        year,
        country_code.to_uppercase(),
        filename
    )
}

struct WorldpopFetcher {
    http: reqwest::Client,
    base_url: String,
    country_code: String,
    prefix: String,
}

#[async_trait]
impl PeriodFetcher for WorldpopFetcher {
    fn file_name(&self, period: &FetchPeriod) -> String {
        format!("{}_{}.tif", self.prefix, period)
    }

    async fn fetch(&self, period: &FetchPeriod, target: &Path) -> Result<()> {
        let FetchPeriod::Year(year) = *period else {
            unreachable!("WorldPop downloads are yearly");
        };
        let url = url_country_for_year(&self.base_url, year, &self.country_code);
        tracing::info!("Reading {} -> {}", year, url);
        download_to_file(&self.http, &url, target).await
    }
}

/// Retrieve yearly population GeoTIFFs for an ISO3 country code between start
/// and end year (inclusive), saved as `{prefix}_{year}.tif`.
pub async fn retrieve(
    start: &str,
    end: &str,
    country_code: &str,
    dirname: impl AsRef<Path>,
    prefix: &str,
    base_url: Option<&str>,
    skip_existing: bool,
) -> Result<Vec<PathBuf>> {
    let parse_year = |s: &str| -> Result<i32> {
        s.trim()
            .get(..4)
            .and_then(|y| y.parse().ok())
            .ok_or_else(|| EoError::InvalidPeriodError {
                value: s.to_string(),
            })
    };
    let start_year = parse_year(start)?;
    let end_year = parse_year(end)?;

    let cache = DownloadCache::open(dirname)?;
    let fetcher = WorldpopFetcher {
        http: reqwest::Client::new(),
        base_url: base_url.unwrap_or(DEFAULT_BASE_URL).to_string(),
        country_code: country_code.to_string(),
        prefix: prefix.to_string(),
    };
    let periods: Vec<FetchPeriod> = (start_year..=end_year).map(FetchPeriod::Year).collect();

    retrieve_periods(&fetcher, &periods, &cache, skip_existing).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_url_cases_path_and_filename_differently() {
        assert_eq!(
            url_country_for_year(DEFAULT_BASE_URL, 2030, "mwi"),
            "https://data.worldpop.org/GIS/Population/Global_2015_2030/R2025A/2030/MWI/v1/100m/constrained/mwi_pop_2030_CN_100m_R2025A_v1.tif"
        );
    }
}
