//! Upstream client tests against a local mock server.

use driftnet_core::config::HttpConfig;
use driftnet_core::fetch::{Fetch, FetchError, UpstreamClient};
use mockito::{Matcher, Server};

fn client() -> UpstreamClient {
    UpstreamClient::from_config(&HttpConfig::default())
}

/// Test: every request carries the browser identity derived from the target
#[tokio::test]
async fn test_browser_identity_headers_sent() {
    let mut server = Server::new_async().await;
    let origin = server.url();

    let mock = server
        .mock("GET", "/api")
        .match_header("user-agent", Matcher::Regex("Mozilla/5\\.0".to_string()))
        .match_header("referer", Matcher::Exact(format!("{origin}/")))
        .match_header("origin", Matcher::Exact(origin.clone()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let value = client().fetch_json(&format!("{origin}/api")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(value["ok"], serde_json::json!(true));
}

/// Test: non-2xx upstream answers surface as status errors
#[tokio::test]
async fn test_status_error_on_non_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("Not Found")
        .create_async()
        .await;

    let result = client()
        .fetch_text(&format!("{}/missing", server.url()))
        .await;

    mock.assert_async().await;
    assert!(matches!(
        result,
        Err(FetchError::Status { status: 404, .. })
    ));
}

/// Test: malformed JSON surfaces as a parse error, not a panic
#[tokio::test]
async fn test_parse_error_on_invalid_json() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/broken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"list": not json"#)
        .create_async()
        .await;

    let result = client().fetch_json(&format!("{}/broken", server.url())).await;

    mock.assert_async().await;
    assert!(matches!(result, Err(FetchError::Parse { .. })));
}

/// Test: an unreachable host is a network error
#[tokio::test]
async fn test_network_error_on_unreachable_host() {
    let result = client().fetch_text("http://127.0.0.1:9/offline").await;

    assert!(matches!(result, Err(FetchError::Network { .. })));
}
