//! Ordered manifest pattern matchers for scraping wrapper pages.
//!
//! Stream URLs published by sources are often HTML player pages wrapping the
//! real manifest inside inline script. The matchers below recover it. They
//! are evaluated in strict priority order with early return, never merged:
//! earlier patterns are more specific and less prone to false positives, so
//! the first matcher that matches anything decides.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::fetch::Fetch;
use crate::urls::has_http_scheme;

/// Relative confidence of a matcher. Priority order encodes this; the enum
/// exists so the list stays self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// Keyed assignment with an absolute URL value
    High,
    /// Keyed assignment with a possibly-relative value
    Medium,
    /// Bare URL token outside quotes
    Low,
    /// Any quoted string mentioning `.m3u8`
    LastResort,
}

/// One named matcher in the priority chain.
#[derive(Debug)]
pub struct ManifestMatcher {
    /// Stable name for logs and tests
    pub name: &'static str,
    /// Relative confidence of a hit
    pub confidence: Confidence,
    pattern: Regex,
}

impl ManifestMatcher {
    fn new(name: &'static str, confidence: Confidence, pattern: &str) -> Self {
        Self {
            name,
            confidence,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    /// First captured candidate in the body, if any.
    pub fn first_match<'b>(&self, body: &'b str) -> Option<&'b str> {
        self.pattern
            .captures(body)
            .and_then(|captures| captures.get(1))
            .map(|group| group.as_str())
    }
}

static MATCHERS: LazyLock<Vec<ManifestMatcher>> = LazyLock::new(|| {
    vec![
        ManifestMatcher::new(
            "keyed-absolute",
            Confidence::High,
            r#"(?i)(?:url|src|link)\s*[:=]\s*["'](https?:[^"']+\.m3u8[^"']*)["']"#,
        ),
        ManifestMatcher::new(
            "keyed-relative",
            Confidence::Medium,
            r#"(?i)(?:url|src)\s*[:=]\s*["']([^"']+\.m3u8[^"']*)["']"#,
        ),
        ManifestMatcher::new(
            "bare-url",
            Confidence::Low,
            r#"(?i)(https?:[^"'<>\s]+\.m3u8[^"'<>\s]*)"#,
        ),
        ManifestMatcher::new(
            "any-quoted",
            Confidence::LastResort,
            r#"(?i)["']([^"']*\.m3u8[^"']*)["']"#,
        ),
    ]
});

/// The matcher chain in priority order.
pub fn matchers() -> &'static [ManifestMatcher] {
    &MATCHERS
}

/// Applies the matcher chain to page text and returns an absolute manifest
/// URL for the first hit.
///
/// Some pages JSON-escape slashes inside inline scripts, so literal
/// `\u002f` sequences are unescaped before resolution. A relative hit resolves
/// against the page URL; if that resolution fails the hit is discarded
/// rather than trying weaker matchers, mirroring the strict priority rule.
pub fn find_manifest_url(body: &str, page_url: &Url) -> Option<String> {
    for matcher in matchers() {
        if let Some(raw) = matcher.first_match(body) {
            let unescaped = raw.replace("\\u002f", "/");
            let candidate = unescaped.trim();
            debug!(matcher = matcher.name, candidate, "manifest pattern hit");
            if has_http_scheme(candidate) {
                return Some(candidate.to_string());
            }
            return page_url.join(candidate).ok().map(Url::into);
        }
    }
    None
}

/// Fetches a page and scrapes it for a manifest URL.
///
/// Every failure mode (fetch error, no pattern hit) collapses to `None`;
/// callers fall back to whatever they have.
pub async fn extract_manifest_url(fetch: &dyn Fetch, page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    match fetch.fetch_text(page_url).await {
        Ok(body) => find_manifest_url(&body, &parsed),
        Err(error) => {
            debug!(page_url, %error, "page scrape fetch failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://player.example.com/watch/1.html").unwrap()
    }

    #[test]
    fn test_keyed_absolute_wins() {
        let body = r#"
            var cruft = "https://decoy.example.com/not-this.m3u8";
            var player = { url: "https://cdn.example.com/live/index.m3u8?sign=abc" };
        "#;
        assert_eq!(
            find_manifest_url(body, &page()).as_deref(),
            Some("https://cdn.example.com/live/index.m3u8?sign=abc")
        );
    }

    #[test]
    fn test_keyed_relative_resolves_against_page() {
        let body = r#"<script>var src = "/hls/index.m3u8";</script>"#;
        assert_eq!(
            find_manifest_url(body, &page()).as_deref(),
            Some("https://player.example.com/hls/index.m3u8")
        );
    }

    #[test]
    fn test_bare_url_token() {
        let body = "player.load(https://cdn.example.com/a/b.m3u8);";
        assert_eq!(
            find_manifest_url(body, &page()).as_deref(),
            Some("https://cdn.example.com/a/b.m3u8")
        );
    }

    #[test]
    fn test_quoted_last_resort() {
        let body = r#"config = ["../streams/ep1.m3u8"]"#;
        assert_eq!(
            find_manifest_url(body, &page()).as_deref(),
            Some("https://player.example.com/streams/ep1.m3u8")
        );
    }

    #[test]
    fn test_escaped_slashes_unescaped() {
        let body = r#"{"url":"https:\u002f\u002fcdn.example.com\u002fhls\u002fx.m3u8"}"#;
        assert_eq!(
            find_manifest_url(body, &page()).as_deref(),
            Some("https://cdn.example.com/hls/x.m3u8")
        );
    }

    #[test]
    fn test_no_match_is_none() {
        assert_eq!(find_manifest_url("<html>no streams here</html>", &page()), None);
    }

    #[test]
    fn test_matcher_order_is_stable() {
        let names: Vec<&str> = matchers().iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            ["keyed-absolute", "keyed-relative", "bare-url", "any-quoted"]
        );
    }
}
