//! Upstream HTTP client with a browser request identity.
//!
//! Upstream sites reject requests that lack a same-origin-looking Referer,
//! so every request carries a browser User-Agent plus `Referer`/`Origin`
//! headers derived from the *target* origin, never from this service's own
//! origin. Callers treat every [`FetchError`] as "this attempt produced
//! nothing" and move on to their next fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
use url::Url;

use crate::config::HttpConfig;

/// Errors from a single upstream request attempt.
///
/// Never surfaced to the end user directly; components absorb these and
/// degrade to their next option.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request exceeded its per-call timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// The URL that timed out
        url: String,
    },

    /// Connection-level failure.
    #[error("Network error for {url}: {reason}")]
    Network {
        /// The URL that failed
        url: String,
        /// The reason for the network error
        reason: String,
    },

    /// Upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status} for {url}")]
    Status {
        /// The URL that was fetched
        url: String,
        /// The HTTP status code received
        status: u16,
    },

    /// The response body could not be parsed as the expected type.
    #[error("Failed to parse response from {url}: {reason}")]
    Parse {
        /// The URL whose body failed to parse
        url: String,
        /// The reason for the parse failure
        reason: String,
    },

    /// The target URL itself is not a valid absolute URL.
    #[error("Invalid target URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// The reason it was rejected
        reason: String,
    },
}

/// Seam for upstream document fetching.
///
/// The aggregator, resolver, and scraper depend on this trait rather than on
/// a concrete client so tests can substitute canned responses.
#[async_trait]
pub trait Fetch: Send + Sync + std::fmt::Debug {
    /// Fetches a URL and parses the body as JSON.
    ///
    /// # Errors
    /// - `FetchError::Timeout` - Per-call timeout exceeded
    /// - `FetchError::Network` - Connection failed
    /// - `FetchError::Status` - Non-2xx upstream response
    /// - `FetchError::Parse` - Body was not valid JSON
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError>;

    /// Fetches a URL and returns the raw body text.
    ///
    /// # Errors
    /// Same taxonomy as [`Fetch::fetch_json`], minus JSON parsing.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Concrete upstream client over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
}

impl UpstreamClient {
    /// Creates a client from the HTTP configuration section.
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: config.user_agent.to_string(),
            timeout: config.request_timeout,
        }
    }

    /// Performs a GET with the browser identity headers and returns the raw
    /// response for callers that need header inspection or body streaming.
    ///
    /// The response status is not checked here; the relay forwards upstream
    /// statuses verbatim.
    ///
    /// # Errors
    /// - `FetchError::InvalidUrl` - Target is not an absolute URL
    /// - `FetchError::Timeout` / `FetchError::Network` - Request failed
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        self.client
            .get(target.clone())
            .headers(self.browser_headers(&target))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_send_error(url, &e))
    }

    fn browser_headers(&self, target: &Url) -> HeaderMap {
        let origin = target.origin().ascii_serialization();
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("{origin}/")) {
            headers.insert(REFERER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&origin) {
            headers.insert(ORIGIN, value);
        }
        headers
    }

    async fn checked(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn classify_send_error(url: &str, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

#[async_trait]
impl Fetch for UpstreamClient {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        let response = self.checked(url).await?;
        response.json().await.map_err(|e| FetchError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.checked(url).await?;
        response.text().await.map_err(|e| FetchError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UpstreamClient {
        UpstreamClient::from_config(&HttpConfig::default())
    }

    #[test]
    fn test_browser_headers_derive_from_target() {
        let target = Url::parse("https://upstream.example.com/api?wd=x").unwrap();
        let headers = client().browser_headers(&target);

        assert_eq!(
            headers.get(REFERER).and_then(|v| v.to_str().ok()),
            Some("https://upstream.example.com/")
        );
        assert_eq!(
            headers.get(ORIGIN).and_then(|v| v.to_str().ok()),
            Some("https://upstream.example.com")
        );
        assert!(
            headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ua| ua.contains("Mozilla/5.0"))
        );
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let result = client().get("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
