//! Image proxy with long-lived caching and placeholder fallback.
//!
//! Cover URLs point at upstream hosts that enforce referrer checks, so the
//! UI loads them through this passthrough instead. Covers rarely change;
//! a day of client-side caching keeps repeat visits cheap.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use crate::server::AppState;

const PLACEHOLDER_PATH: &str = "/placeholder.svg";

/// Query parameters for `/img`.
#[derive(Debug, Deserialize)]
pub struct ImgParams {
    /// Absolute upstream image URL
    pub src: Option<String>,
}

/// `GET /img?src=<absolute-url>`
///
/// Proxies the image bytes with a long cache lifetime; any failure
/// (missing parameter, unreachable upstream, non-success status) redirects
/// to the bundled placeholder asset instead of erroring.
pub async fn img_proxy(
    State(state): State<AppState>,
    Query(params): Query<ImgParams>,
) -> Response {
    let Some(src) = params
        .src
        .as_deref()
        .map(str::trim)
        .filter(|src| !src.is_empty())
    else {
        return placeholder_redirect();
    };

    match state.client.get(src).await {
        Ok(upstream) if upstream.status().is_success() => {
            let content_type = upstream
                .headers()
                .get("content-type")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("")
                .to_string();

            let mut builder = Response::builder()
                .status(StatusCode::OK)
                .header(header::CACHE_CONTROL, "public, max-age=86400");
            if !content_type.is_empty() {
                builder = builder.header(header::CONTENT_TYPE, content_type);
            }
            builder
                .body(Body::from_stream(upstream.bytes_stream()))
                .unwrap_or_else(|_| placeholder_redirect())
        }
        Ok(upstream) => {
            debug!(src, status = upstream.status().as_u16(), "image upstream refused");
            placeholder_redirect()
        }
        Err(error) => {
            debug!(src, %error, "image fetch failed");
            placeholder_redirect()
        }
    }
}

fn placeholder_redirect() -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, PLACEHOLDER_PATH)
        .body(Body::empty())
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
