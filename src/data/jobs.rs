//! Asynchronous job client for the CDS/ECMWF archive services.
//!
//! Both services process retrievals as remote jobs: a request is submitted and
//! queued, the client polls the job status, and the result file is downloaded
//! once the service reports it ready. Job identifiers are the only state; a
//! pipeline interrupted mid-poll simply resubmits on the next run and skips
//! whatever already landed on disk.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::data::download_to_file;
use crate::utils::error::{EoError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct JobClient {
    http: reqwest::Client,
    base_url: String,
    key: String,
    poll_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Queued,
    Running,
    /// Result file is ready at the given location.
    Completed { location: String },
    Failed { message: String },
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(alias = "jobID", alias = "request_id")]
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultsResponse {
    asset: ResultAsset,
}

#[derive(Debug, Deserialize)]
struct ResultAsset {
    value: ResultLocation,
}

#[derive(Debug, Deserialize)]
struct ResultLocation {
    href: String,
}

/// A per-file download slot for the many-jobs sweep. `handle` is `None` when
/// the file was already cached and nothing was submitted for it.
#[derive(Debug)]
pub struct PendingDownload {
    pub target: std::path::PathBuf,
    pub handle: Option<JobHandle>,
}

impl JobClient {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Submit a retrieval request for `dataset` and return its job handle.
    pub async fn submit(&self, dataset: &str, params: Value) -> Result<JobHandle> {
        let url = format!("{}/processes/{}/execution", self.base_url, dataset);
        tracing::info!("Submitting request to {}", url);
        tracing::debug!("Request parameters: {}", params);

        let response = self
            .http
            .post(&url)
            .header("PRIVATE-TOKEN", &self.key)
            .json(&json!({ "inputs": params }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EoError::RemoteStatusError {
                status: response.status().as_u16(),
                url,
            });
        }

        let submitted: SubmitResponse = response.json().await?;
        tracing::info!("Job accepted with request id {}", submitted.job_id);
        Ok(JobHandle {
            request_id: submitted.job_id,
        })
    }

    /// Fetch the current status of a submitted job.
    pub async fn status(&self, handle: &JobHandle) -> Result<JobStatus> {
        let url = format!("{}/jobs/{}", self.base_url, handle.request_id);
        let response = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EoError::RemoteStatusError {
                status: response.status().as_u16(),
                url,
            });
        }

        let status: StatusResponse = response.json().await?;
        match status.status.as_str() {
            "accepted" | "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "successful" | "completed" => {
                let location = self.results_location(handle).await?;
                Ok(JobStatus::Completed { location })
            }
            "failed" | "rejected" | "dismissed" => Ok(JobStatus::Failed {
                message: status
                    .message
                    .unwrap_or_else(|| "no failure message provided".to_string()),
            }),
            other => Err(EoError::processing(format!(
                "Unrecognized job status '{}' for request {}",
                other, handle.request_id
            ))),
        }
    }

    async fn results_location(&self, handle: &JobHandle) -> Result<String> {
        let url = format!("{}/jobs/{}/results", self.base_url, handle.request_id);
        let response = self
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EoError::RemoteStatusError {
                status: response.status().as_u16(),
                url,
            });
        }

        let results: ResultsResponse = response.json().await?;
        Ok(results.asset.value.href)
    }

    /// Download a ready result to `target`.
    pub async fn download(&self, location: &str, target: &Path) -> Result<()> {
        // Result locations can be relative to the service root.
        let url = if location.starts_with("http://") || location.starts_with("https://") {
            location.to_string()
        } else {
            format!("{}/{}", self.base_url, location.trim_start_matches('/'))
        };
        download_to_file(&self.http, &url, target).await
    }

    /// Poll a single job until it completes, then download the result.
    pub async fn wait_and_download(&self, handle: &JobHandle, target: &Path) -> Result<()> {
        loop {
            match self.status(handle).await? {
                JobStatus::Completed { location } => {
                    tracing::info!("Request ready, downloading to {}", target.display());
                    return self.download(&location, target).await;
                }
                JobStatus::Failed { message } => {
                    return Err(EoError::JobFailedError {
                        request_id: handle.request_id.clone(),
                        message,
                    });
                }
                status => {
                    tracing::debug!("Request {} still {:?}", handle.request_id, status);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Sweep a batch of submitted jobs, downloading each result as it becomes
    /// ready, until none remain. Slots without a handle are cache hits and are
    /// left untouched. A failed job aborts the whole batch.
    pub async fn poll_all(&self, jobs: &mut [PendingDownload]) -> Result<()> {
        loop {
            let remaining = jobs.iter().filter(|j| j.handle.is_some()).count();
            if remaining == 0 {
                tracing::info!("All job requests finished");
                return Ok(());
            }

            tracing::info!("Checking results for {} remaining job requests", remaining);
            for job in jobs.iter_mut() {
                let Some(handle) = &job.handle else {
                    continue;
                };
                match self.status(handle).await? {
                    JobStatus::Completed { location } => {
                        tracing::info!("Request ready, downloading to {}", job.target.display());
                        self.download(&location, &job.target).await?;
                        job.handle = None;
                    }
                    JobStatus::Failed { message } => {
                        return Err(EoError::JobFailedError {
                            request_id: handle.request_id.clone(),
                            message,
                        });
                    }
                    _ => {}
                }
            }

            if jobs.iter().any(|j| j.handle.is_some()) {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }
}
