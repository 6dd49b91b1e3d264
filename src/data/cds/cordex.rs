//! CORDEX daily climate projections from the CDS.
//!
//! The archive stores daily projections in fixed 5-year blocks, and each
//! GCM/RCM pair is a separate product, so a retrieval fans out into one job
//! per (model pair, year block). All jobs are submitted up front and then
//! polled together, downloading each result as it becomes ready.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::core::cache::DownloadCache;
use crate::data::cds::cordex_models::{model_stub, ModelPair};
use crate::data::jobs::{JobClient, PendingDownload};
use crate::utils::error::Result;

pub const DATASET: &str = "projections-cordex-domains-single-levels";

// Known-good daily-mean archive layout. The rcm `ictp_regcm4_7` publishes in
// yearly rather than 5-yearly blocks and is skipped for now.
// TODO: handle the yearly-block layout so ICTP-RegCM4-7 can be requested.
const SKIP_RCMS: &[&str] = &["ictp_regcm4_7"];
const BLOCK_START_YEARS: std::ops::RangeInclusive<i32> = 2006..=2091;

#[derive(Debug, Clone)]
pub struct CordexRequest {
    pub domain: String,
    pub scenario: String,
    pub resolution: String,
    pub variables: Vec<String>,
    pub models: Vec<ModelPair>,
}

/// 5-year (start, end) blocks overlapping the caller's year range.
fn year_blocks(start_year: i32, end_year: i32) -> Vec<(i32, i32)> {
    BLOCK_START_YEARS
        .step_by(5)
        .map(|block_start| (block_start, block_start + 4))
        .filter(|&(block_start, block_end)| block_start <= end_year && block_end >= start_year)
        .collect()
}

fn block_params(request: &CordexRequest, model: &ModelPair, start: i32, end: i32) -> Value {
    json!({
        "domain": request.domain,
        "experiment": request.scenario,
        "horizontal_resolution": request.resolution,
        "temporal_resolution": "daily_mean",
        "variable": request.variables,
        "gcm_model": model_stub(model.gcm),
        "rcm_model": model_stub(model.rcm),
        "ensemble_member": "r1i1p1",
        "start_year": [start.to_string()],
        "end_year": [end.to_string()],
        "download_format": "unarchived",
    })
}

/// Submit one job per model pair and year block, skipping cached files, then
/// poll until every result is downloaded. `start_date`/`end_date` only need a
/// year part. Returns the paths of all block files.
pub async fn retrieve(
    client: &JobClient,
    start_date: &str,
    end_date: &str,
    request: &CordexRequest,
    dirname: impl AsRef<Path>,
    prefix: &str,
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    let start_year: i32 = start_date
        .get(..4)
        .and_then(|y| y.parse().ok())
        .ok_or_else(|| crate::utils::error::EoError::InvalidPeriodError {
            value: start_date.to_string(),
        })?;
    let end_year: i32 = end_date
        .get(..4)
        .and_then(|y| y.parse().ok())
        .ok_or_else(|| crate::utils::error::EoError::InvalidPeriodError {
            value: end_date.to_string(),
        })?;

    let cache = DownloadCache::open(dirname)?;
    let blocks = year_blocks(start_year, end_year);
    if blocks.is_empty() {
        tracing::warn!(
            "No archive blocks cover years {} to {}; nothing to retrieve",
            start_year,
            end_year
        );
    }

    let mut jobs: Vec<PendingDownload> = Vec::new();
    for model in &request.models {
        tracing::info!("GCM model {} / RCM model {}", model.gcm, model.rcm);
        if SKIP_RCMS.contains(&model_stub(model.rcm).as_str()) {
            tracing::warn!("Skipping RCM {} (unsupported block layout)", model.rcm);
            continue;
        }

        for &(block_start, block_end) in &blocks {
            tracing::info!("Years {} to {}", block_start, block_end);
            let file_name = format!(
                "{}_{}_{}_{}-{}.nc",
                prefix,
                model_stub(model.gcm),
                model_stub(model.rcm),
                block_start,
                block_end
            );
            let target = cache.target(&file_name);

            if !overwrite && target.exists() {
                tracing::info!("File already exists, reusing from cache: {}", target.display());
                jobs.push(PendingDownload {
                    target,
                    handle: None,
                });
                continue;
            }

            tracing::info!("Requesting climate projection data from CDS API...");
            let params = block_params(request, model, block_start, block_end);
            let handle = client.submit(DATASET, params).await?;
            jobs.push(PendingDownload {
                target,
                handle: Some(handle),
            });
        }
    }

    client.poll_all(&mut jobs).await?;
    Ok(jobs.into_iter().map(|j| j.target).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_align_to_archive_grid() {
        assert_eq!(year_blocks(2006, 2015), vec![(2006, 2010), (2011, 2015)]);
        // A misaligned range picks every block it touches.
        assert_eq!(year_blocks(2008, 2012), vec![(2006, 2010), (2011, 2015)]);
        assert_eq!(
            year_blocks(2008, 2020),
            vec![(2006, 2010), (2011, 2015), (2016, 2020)]
        );
        assert!(year_blocks(2096, 2099).is_empty());
        assert!(year_blocks(2000, 2005).is_empty());
    }

    #[test]
    fn block_params_use_model_stubs() {
        let request = CordexRequest {
            domain: "africa".to_string(),
            scenario: "rcp_4_5".to_string(),
            resolution: "0_22_degree_x_0_22_degree".to_string(),
            variables: vec!["2m_air_temperature".to_string()],
            models: vec![],
        };
        let model = ModelPair {
            gcm: "CCCma-CanESM2",
            rcm: "CCCma-CanRCM4",
        };
        let params = block_params(&request, &model, 2006, 2010);
        assert_eq!(params["gcm_model"], "cccma_canesm2");
        assert_eq!(params["rcm_model"], "cccma_canrcm4");
        assert_eq!(params["start_year"], serde_json::json!(["2006"]));
        assert_eq!(params["temporal_resolution"], "daily_mean");
    }
}
