//! Contract tests for the Reporting client against a mock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytkit_clients::reporting::{ReportingClient, ReportingOpts};
use ytkit_core::ApiError;
use ytkit_session::Session;

fn client_for(server: &MockServer) -> ReportingClient {
    let session = Arc::new(Session::from_token("test-token").unwrap());
    ReportingClient::new(session).with_base_url(server.uri())
}

#[tokio::test]
async fn list_jobs_parses_typed_models() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("includeSystemManaged", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [{
                "id": "j1",
                "name": "daily",
                "reportTypeId": "channel_basic_a2",
                "createTime": "2024-01-01T00:00:00Z"
            }],
            "nextPageToken": "more"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (jobs, token) = client
        .list_jobs(&ReportingOpts::new().include_system_managed(true))
        .await
        .unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].report_type_id, "channel_basic_a2");
    assert!(jobs[0].create_time.is_some());
    assert_eq!(token.as_deref(), Some("more"));
}

#[tokio::test]
async fn create_job_posts_a_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .and(body_json(json!({
            "reportTypeId": "channel_basic_a2",
            "name": "daily"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "j9",
            "name": "daily",
            "reportTypeId": "channel_basic_a2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let job = client
        .create_job("channel_basic_a2", "daily", None)
        .await
        .unwrap();
    assert_eq!(job.id, "j9");
}

#[tokio::test]
async fn delete_job_accepts_204() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/jobs/j1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_job("j1", None).await.unwrap();
}

#[tokio::test]
async fn get_latest_report_picks_newest_and_downloads() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [{
                "id": "j1",
                "name": "My Daily Job",
                "reportTypeId": "channel_basic_a2",
                "createTime": "2024-01-01T00:00:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let newest_url = format!("{}/media/r2.csv", server.uri());
    let older_url = format!("{}/media/r1.csv", server.uri());
    Mock::given(method("GET"))
        .and(path("/jobs/j1/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reports": [
                {
                    "id": "r1",
                    "startTime": "2024-01-01T00:00:00Z",
                    "createTime": "2024-01-02T00:00:00Z",
                    "downloadUrl": older_url
                },
                {
                    "id": "r2",
                    "startTime": "2024-02-01T00:00:00Z",
                    "createTime": "2024-02-02T00:00:00Z",
                    "downloadUrl": newest_url
                }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/media/r2.csv"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("date,views\n20240201,42\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    // Matching is case-insensitive and works by report type or job name.
    let table = client.get_latest_report("CHANNEL_BASIC_A2").await.unwrap();
    assert_eq!(table.n_rows(), 1);
    assert_eq!(table.get(0, "views").unwrap().as_i64(), Some(42));
}

#[tokio::test]
async fn get_latest_report_rejects_unknown_identifier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobs": []})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.get_latest_report("nope").await.unwrap_err();
    assert!(matches!(err.as_api(), Some(ApiError::InvalidArgument(_))));
}
