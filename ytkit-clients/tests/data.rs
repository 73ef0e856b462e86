//! Contract tests for the Data client against a mock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytkit_clients::data::{DataClient, ListParams};
use ytkit_session::Session;

fn client_for(server: &MockServer) -> DataClient {
    let session = Arc::new(Session::from_token("test-token").unwrap());
    DataClient::new(session).with_base_url(server.uri())
}

#[tokio::test]
async fn list_reshapes_items_into_a_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("part", "snippet"))
        .and(query_param("id", "a,b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "a", "snippet": {"title": "First"}},
                {"id": "b", "snippet": {"title": "Second"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .videos_list(["a", "b"], &ListParams::new())
        .await
        .unwrap();

    assert_eq!(page.items.n_rows(), 2);
    assert_eq!(page.items.column_names(), vec!["id", "snippet"]);
    assert!(page.next_page_token.is_none());
}

#[tokio::test]
async fn collect_all_follows_tokens_until_exhaustion() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "i1"}, {"id": "i2"}],
            "nextPageToken": "page2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "i3"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let table = client
        .collect_all("playlistItems", &ListParams::new().playlist_id("PL1"))
        .await
        .unwrap();

    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.get(2, "id").unwrap().as_str(), Some("i3"));
}

#[tokio::test]
async fn search_pre_fills_the_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust tutorials"))
        .and(query_param("maxResults", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .search_list("rust tutorials", &ListParams::new().max_results(5))
        .await
        .unwrap();

    assert!(page.items.is_empty());
}
