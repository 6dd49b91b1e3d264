use std::path::Path;

use async_trait::async_trait;

use crate::domain::model::FetchPeriod;
use crate::utils::error::Result;

/// One provider-specific download unit. Implementations build the remote
/// request for a single period and write the result to `target`; the shared
/// retrieve driver handles the cache-skip loop around them.
#[async_trait]
pub trait PeriodFetcher: Send + Sync {
    /// File name (within the cache directory) for this period's download.
    fn file_name(&self, period: &FetchPeriod) -> String;

    /// Download one period into `target`.
    async fn fetch(&self, period: &FetchPeriod, target: &Path) -> Result<()>;

    /// Whether a cached file for this period must be refreshed anyway
    /// (e.g. trailing months the provider has not finished publishing).
    fn force_refresh(&self, _period: &FetchPeriod) -> bool {
        false
    }
}
