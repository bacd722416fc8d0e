//! Stream relay: manifest rewriting, wrapper-page skipping, passthrough.
//!
//! Every URL embedded in a relayed manifest is rewritten to point back at
//! `/stream`, so each subsequent fetch the player performs also goes through
//! the relay - recursively, with no origin or referrer leaking to upstream
//! and no client-side rewriting needed.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use driftnet_core::scrape::find_manifest_url;
use driftnet_core::urls::is_manifest_url;

use crate::server::AppState;

const HLS_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Query parameters for `/stream`.
#[derive(Debug, Deserialize)]
pub struct RelayParams {
    /// Absolute upstream URL to relay
    pub url: Option<String>,
}

/// `GET /stream?url=<absolute-url>`
///
/// Classifies the upstream response as manifest, HTML wrapper, or opaque
/// bytes. Manifests are rewritten line by line, wrapper pages redirect to
/// the manifest they embed, and everything else streams through verbatim.
/// No retries: segments are numerous and short-lived, the player's own
/// retry logic handles individual losses.
pub async fn stream_relay(
    State(state): State<AppState>,
    Query(params): Query<RelayParams>,
) -> Response {
    let Some(target) = params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
    else {
        return (StatusCode::BAD_REQUEST, "missing url").into_response();
    };
    let Ok(target_url) = Url::parse(&target) else {
        return (StatusCode::BAD_REQUEST, "invalid url").into_response();
    };

    let upstream = match state.client.get(&target).await {
        Ok(response) => response,
        Err(error) => {
            warn!(url = %target, %error, "relay upstream fetch failed");
            return bad_gateway();
        }
    };

    let status = upstream.status().as_u16();
    let content_type = upstream
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    if is_manifest_response(&content_type, &target) {
        let Ok(body) = upstream.text().await else {
            return bad_gateway();
        };
        let rewritten = rewrite_manifest(&body, &target_url);
        return (
            [
                (header::CONTENT_TYPE, HLS_CONTENT_TYPE),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            rewritten,
        )
            .into_response();
    }

    if content_type.contains("text/html") {
        let Ok(body) = upstream.text().await else {
            return bad_gateway();
        };
        if let Some(found) = find_manifest_url(&body, &target_url) {
            debug!(url = %target, manifest = %found, "skipping through wrapper page");
            return redirect_found(&relay_path(&found));
        }
        // Wrapper page with nothing to skip to: forward it as-is.
        return passthrough(status, &content_type, Body::from(body));
    }

    passthrough(
        status,
        &content_type,
        Body::from_stream(upstream.bytes_stream()),
    )
}

/// Relay-local path for an absolute upstream URL.
fn relay_path(url: &str) -> String {
    format!("/stream?url={}", urlencoding::encode(url))
}

/// Manifest detection: declared HLS content types, or a `.m3u8` target URL
/// served as any `text/*` type - some upstream servers mislabel manifests
/// as plain text.
fn is_manifest_response(content_type: &str, target: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.contains("application/vnd.apple.mpegurl")
        || ct.contains("application/x-mpegurl")
        || (is_manifest_url(target) && ct.contains("text"))
}

/// Rewrites every segment or sub-manifest reference to a relay-local URL.
///
/// Blank lines and `#` directives pass through unchanged; every other line
/// resolves against the manifest URL and becomes `/stream?url=<absolute>`.
fn rewrite_manifest(body: &str, target: &Url) -> String {
    body.split('\n')
        .map(|raw_line| {
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return line.to_string();
            }
            match target.join(trimmed) {
                Ok(absolute) => relay_path(absolute.as_str()),
                Err(_) => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn redirect_found(location: &str) -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .body(Body::empty())
        .unwrap_or_else(|_| bad_gateway())
}

fn passthrough(status: u16, content_type: &str, body: Body) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY))
        .header(header::CACHE_CONTROL, "no-cache");
    if !content_type.is_empty() {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).unwrap_or_else(|_| bad_gateway())
}

fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "bad gateway").into_response()
}
