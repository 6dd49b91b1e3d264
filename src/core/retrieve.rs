//! Shared retrieve loop: every provider adapter resolves one file per period,
//! skips periods already on disk, and returns the full list of paths
//! (cached and freshly downloaded alike) for downstream multi-file readers.

use std::path::PathBuf;

use crate::core::cache::DownloadCache;
use crate::domain::model::FetchPeriod;
use crate::domain::ports::PeriodFetcher;
use crate::utils::error::Result;

pub async fn retrieve_periods<F: PeriodFetcher>(
    fetcher: &F,
    periods: &[FetchPeriod],
    cache: &DownloadCache,
    skip_existing: bool,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::with_capacity(periods.len());

    for period in periods {
        tracing::info!("Period {}", period);

        let file_name = fetcher.file_name(period);
        let target = cache.target(&file_name);
        files.push(target.clone());

        if skip_existing && target.exists() && !fetcher.force_refresh(period) {
            tracing::info!("File already downloaded: {}", target.display());
            continue;
        }

        fetcher.fetch(period, &target).await?;
        tracing::info!("Saved {}", target.display());
    }

    Ok(files)
}
