//! Provider adapters. Each submodule follows the same shape: build request
//! parameters, submit/poll/download (or plain GET), cache to disk, and return
//! the list of file paths.

pub mod cds;
pub mod chc;
pub mod ecmwf;
pub mod jobs;
pub mod worldpop;

use std::path::Path;

use crate::utils::error::{EoError, Result};

/// GET `url` and write the body to `target`. Writes to a `.part` file first
/// and renames on success, so interrupted downloads never look cached.
pub(crate) async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    target: &Path,
) -> Result<()> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(EoError::RemoteStatusError {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut part = target.as_os_str().to_owned();
    part.push(".part");
    let part = std::path::PathBuf::from(part);
    std::fs::write(&part, &bytes)?;
    std::fs::rename(&part, target)?;
    Ok(())
}
