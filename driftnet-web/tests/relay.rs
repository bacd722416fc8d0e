//! Relay and image proxy handler tests against local mock upstreams.

use axum::body::to_bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use driftnet_core::catalog::SourceCatalog;
use driftnet_core::config::DriftnetConfig;
use driftnet_web::AppState;
use driftnet_web::handlers::{img_proxy, stream_relay};

fn state() -> AppState {
    AppState::new(&DriftnetConfig::for_testing(), SourceCatalog::new(Vec::new()))
}

async fn relay(url: Option<&str>) -> axum::response::Response {
    let params = driftnet_web::handlers::RelayParams {
        url: url.map(str::to_string),
    };
    stream_relay(State(state()), Query(params)).await
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Test: missing url parameter is a client error
#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let response = relay(None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = relay(Some("   ")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Test: a declared HLS manifest is rewritten line by line
#[tokio::test]
async fn test_manifest_rewritten() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/hls/index.m3u8")
        .with_status(200)
        .with_header("content-type", "application/vnd.apple.mpegurl")
        .with_body("#EXTM3U\n#EXTINF:10,\nseg1.ts\n#EXT-X-ENDLIST")
        .create_async()
        .await;

    let target = format!("{}/hls/index.m3u8", server.url());
    let response = relay(Some(&target)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/vnd.apple.mpegurl")
    );
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-cache")
    );

    let body = body_string(response).await;
    let expected_segment = format!(
        "/stream?url={}",
        urlencoding::encode(&format!("{}/hls/seg1.ts", server.url()))
    );
    assert!(body.contains("#EXTM3U"));
    assert!(body.contains(&expected_segment), "body was: {body}");
}

/// Test: a .m3u8 URL mislabeled as plain text is still treated as a manifest
#[tokio::test]
async fn test_mislabeled_manifest_rewritten() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/mislabeled/index.m3u8")
        .with_status(200)
        .with_header("content-type", "text/plain; charset=utf-8")
        .with_body("seg1.ts")
        .create_async()
        .await;

    let target = format!("{}/mislabeled/index.m3u8", server.url());
    let response = relay(Some(&target)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.starts_with("/stream?url="), "body was: {body}");
}

/// Test: an HTML wrapper page redirects to the manifest it embeds
#[tokio::test]
async fn test_html_wrapper_redirects() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/watch/1.html")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(r#"<html><script>var url = "https://cdn.example.com/real.m3u8";</script></html>"#)
        .create_async()
        .await;

    let target = format!("{}/watch/1.html", server.url());
    let response = relay(Some(&target)).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(
        location,
        format!(
            "/stream?url={}",
            urlencoding::encode("https://cdn.example.com/real.m3u8")
        )
    );
}

/// Test: HTML without any manifest passes through with upstream status
#[tokio::test]
async fn test_html_without_manifest_passes_through() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/plain.html")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html><body>nothing streamable</body></html>")
        .create_async()
        .await;

    let target = format!("{}/plain.html", server.url());
    let response = relay(Some(&target)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("nothing streamable"));
}

/// Test: opaque bodies stream through with status and content type intact
#[tokio::test]
async fn test_opaque_passthrough() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/media/seg1.ts")
        .with_status(200)
        .with_header("content-type", "video/mp2t")
        .with_body(&b"\x47\x40\x00\x10binary segment"[..])
        .create_async()
        .await;

    let target = format!("{}/media/seg1.ts", server.url());
    let response = relay(Some(&target)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("video/mp2t")
    );
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("no-cache")
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..4], b"\x47\x40\x00\x10");
}

/// Test: an unreachable upstream is a gateway error
#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let response = relay(Some("http://127.0.0.1:9/gone.m3u8")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

/// Test: the image proxy stamps long-lived caching on success
#[tokio::test]
async fn test_img_proxy_success() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/cover.jpg")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(&b"\xff\xd8\xff\xe0fakejpeg"[..])
        .create_async()
        .await;

    let params = driftnet_web::handlers::ImgParams {
        src: Some(format!("{}/cover.jpg", server.url())),
    };
    let response = img_proxy(State(state()), Query(params)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok()),
        Some("public, max-age=86400")
    );
}

/// Test: missing src or a dead upstream redirect to the placeholder
#[tokio::test]
async fn test_img_proxy_placeholder_fallback() {
    let params = driftnet_web::handlers::ImgParams { src: None };
    let response = img_proxy(State(state()), Query(params)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/placeholder.svg")
    );

    let params = driftnet_web::handlers::ImgParams {
        src: Some("http://127.0.0.1:9/cover.jpg".to_string()),
    };
    let response = img_proxy(State(state()), Query(params)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}
