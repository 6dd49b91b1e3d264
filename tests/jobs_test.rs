use std::time::Duration;

use httpmock::prelude::*;
use tempfile::TempDir;

use dhis2eo::data::jobs::{JobClient, JobStatus, PendingDownload};
use dhis2eo::EoError;

fn client(server: &MockServer) -> JobClient {
    JobClient::new(server.base_url(), "test-key").with_poll_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn submit_returns_job_handle() {
    let server = MockServer::start();
    let submit_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/processes/reanalysis-era5-land/execution")
            .header("PRIVATE-TOKEN", "test-key")
            .json_body_partial(r#"{"inputs": {"year": "2024"}}"#);
        then.status(201)
            .json_body(serde_json::json!({"jobID": "abc-123", "status": "accepted"}));
    });

    let client = client(&server);
    let handle = client
        .submit("reanalysis-era5-land", serde_json::json!({"year": "2024"}))
        .await
        .unwrap();

    submit_mock.assert();
    assert_eq!(handle.request_id, "abc-123");
}

#[tokio::test]
async fn status_maps_remote_states() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/jobs/queued-job");
        then.status(200).json_body(serde_json::json!({"status": "accepted"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/jobs/failed-job");
        then.status(200)
            .json_body(serde_json::json!({"status": "failed", "message": "bad request"}));
    });

    let client = client(&server);
    let queued = client
        .status(&dhis2eo::data::jobs::JobHandle {
            request_id: "queued-job".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(queued, JobStatus::Queued);

    let failed = client
        .status(&dhis2eo::data::jobs::JobHandle {
            request_id: "failed-job".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(
        failed,
        JobStatus::Failed {
            message: "bad request".to_string()
        }
    );
}

#[tokio::test]
async fn wait_and_download_polls_until_ready() {
    let server = MockServer::start();
    let mut running_mock = server.mock(|when, then| {
        when.method(GET).path("/jobs/slow-job");
        then.status(200).json_body(serde_json::json!({"status": "running"}));
    });

    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("result.nc");
    let client = client(&server);
    let handle = dhis2eo::data::jobs::JobHandle {
        request_id: "slow-job".to_string(),
    };

    let task = tokio::spawn({
        let client = client.clone();
        let handle = handle.clone();
        let target = target.clone();
        async move { client.wait_and_download(&handle, &target).await }
    });

    // Let a few polls observe the running state, then flip to successful.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(running_mock.hits() >= 1);
    running_mock.delete();
    server.mock(|when, then| {
        when.method(GET).path("/jobs/slow-job");
        then.status(200).json_body(serde_json::json!({"status": "successful"}));
    });
    let download_url = server.url("/results/data.nc");
    server.mock(|when, then| {
        when.method(GET).path("/jobs/slow-job/results");
        then.status(200)
            .json_body(serde_json::json!({"asset": {"value": {"href": download_url}}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/results/data.nc");
        then.status(200).body("netcdf-bytes");
    });

    task.await.unwrap().unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"netcdf-bytes");
    // No leftover partial file after the rename.
    assert!(!tmp.path().join("result.nc.part").exists());
}

#[tokio::test]
async fn failed_job_surfaces_remote_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/jobs/broken");
        then.status(200)
            .json_body(serde_json::json!({"status": "failed", "message": "quota exceeded"}));
    });

    let tmp = TempDir::new().unwrap();
    let client = client(&server);
    let handle = dhis2eo::data::jobs::JobHandle {
        request_id: "broken".to_string(),
    };
    let err = client
        .wait_and_download(&handle, &tmp.path().join("x.nc"))
        .await
        .unwrap_err();

    match err {
        EoError::JobFailedError {
            request_id,
            message,
        } => {
            assert_eq!(request_id, "broken");
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("expected JobFailedError, got {:?}", other),
    }
}

#[tokio::test]
async fn poll_all_downloads_ready_jobs_and_skips_cache_hits() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/jobs/job-a");
        then.status(200).json_body(serde_json::json!({"status": "successful"}));
    });
    let a_url = server.url("/results/a.nc");
    server.mock(|when, then| {
        when.method(GET).path("/jobs/job-a/results");
        then.status(200)
            .json_body(serde_json::json!({"asset": {"value": {"href": a_url}}}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/results/a.nc");
        then.status(200).body("block-a");
    });

    let tmp = TempDir::new().unwrap();
    let cached = tmp.path().join("cached.nc");
    std::fs::write(&cached, b"old").unwrap();

    let mut jobs = vec![
        PendingDownload {
            target: tmp.path().join("a.nc"),
            handle: Some(dhis2eo::data::jobs::JobHandle {
                request_id: "job-a".to_string(),
            }),
        },
        PendingDownload {
            target: cached.clone(),
            handle: None,
        },
    ];

    client(&server).poll_all(&mut jobs).await.unwrap();

    assert_eq!(std::fs::read(tmp.path().join("a.nc")).unwrap(), b"block-a");
    // The cache-hit slot was never touched.
    assert_eq!(std::fs::read(&cached).unwrap(), b"old");
    assert!(jobs.iter().all(|j| j.handle.is_none()));
}
