//! Contract tests for the Analytics client against a mock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytkit_clients::analytics::{AnalyticsClient, ReportsQuery};
use ytkit_core::ApiError;
use ytkit_session::Session;

fn report_body(rows: serde_json::Value) -> serde_json::Value {
    json!({
        "kind": "youtubeAnalytics#resultTable",
        "columnHeaders": [
            {"name": "country", "columnType": "DIMENSION", "dataType": "STRING"},
            {"name": "views", "columnType": "METRIC", "dataType": "INTEGER"}
        ],
        "rows": rows
    })
}

fn client_for(server: &MockServer) -> AnalyticsClient {
    let session = Arc::new(Session::from_token("test-token").unwrap());
    AnalyticsClient::new(session).with_base_url(format!("{}/v2/reports", server.uri()))
}

#[tokio::test]
async fn query_parameters_reach_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/reports"))
        .and(query_param("ids", "channel==MINE"))
        .and(query_param("metrics", "views,likes"))
        .and(query_param("dimensions", "day"))
        .and(query_param("sort", "-views"))
        .and(query_param("maxResults", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(report_body(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let table = client
        .reports_query(&ReportsQuery::new().metrics(["views", "likes"]).dimensions(["day"]))
        .await
        .unwrap();

    assert_eq!(table.column_names(), vec!["country", "views"]);
    assert_eq!(table.n_rows(), 0);
}

#[tokio::test]
async fn video_geography_builds_per_id_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("dimensions", "video,country"))
        .and(query_param("filters", "video==abc123"))
        .and(query_param("maxResults", "200"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(report_body(json!([["US", 123]]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let table = client
        .video_geography("abc123", "country", ReportsQuery::new())
        .await
        .unwrap();

    assert_eq!(table.n_rows(), 1);
    assert_eq!(table.get(0, "views").unwrap().as_i64(), Some(123));
}

#[tokio::test]
async fn fan_out_concatenates_per_id_tables() {
    let server = MockServer::start().await;
    for id in ["vid1", "vid2"] {
        Mock::given(method("GET"))
            .and(query_param("filters", format!("video=={id}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(report_body(json!([["US", 1]]))),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let table = client
        .video_stats(["vid1", "vid2"], ReportsQuery::new())
        .await
        .unwrap();

    assert_eq!(table.n_rows(), 2);
}

#[tokio::test]
async fn quota_payload_maps_to_quota_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            r#"{"error":{"code":403,"message":"quota","errors":[{"reason":"quotaExceeded"}]}}"#,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .reports_query(&ReportsQuery::new())
        .await
        .unwrap_err();

    assert!(matches!(err.as_api(), Some(ApiError::QuotaExceeded(_))));
}

#[tokio::test]
async fn bad_geo_dim_fails_without_a_request() {
    // No mock server: validation must reject before any request is sent.
    let session = Arc::new(Session::from_token("test-token").unwrap());
    let client = AnalyticsClient::new(session);

    let err = client
        .video_geography("abc123", "planet", ReportsQuery::new())
        .await
        .unwrap_err();

    let text = err.to_string();
    assert!(text.contains("geo_dim=\"planet\" is invalid"));
    assert!(text.contains("country"));
}
